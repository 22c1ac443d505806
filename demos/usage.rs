//! Example: verify LTL specifications against bundled Kripke models.
//!
//! This example demonstrates how to:
//! 1. Load Kripke structures from JSON
//! 2. Verify LTL formulas against them
//! 3. Print verdicts and counterexample lassos
//!
//! Run with: cargo run --example usage

use ltl_verify::*;

const MODELS: &[(&str, &[&str])] = &[
    (
        "demos/models/micro-oven.json",
        &[
            "G ((!close && start) -> F cooking)",
            "G ((close && start) -> F cooking)",
            "G F cooking",
        ],
    ),
    (
        "demos/models/two-stage-elevator.json",
        &[
            "G (move -> F (first || second))",
            "G (move -> F (first && !second))",
            "G F move && (!first || !second)",
        ],
    ),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    for (path, formulas) in MODELS {
        let kripke = KripkeStructure::from_file(path)?;
        println!("{path} ({} states)", kripke.len());

        for text in *formulas {
            let result = verify_str(&kripke, text)?;
            let verdict = if result.confirmed { "confirmed" } else { "declined" };
            println!("  {text}: {verdict}");
            for counterexample in &result.counterexamples {
                println!("    counterexample: {counterexample}");
            }
        }
    }

    Ok(())
}
