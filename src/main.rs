#![allow(non_snake_case)]
use properror::Examples::propagation_examples::PropagationExample;
use strum::IntoEnumIterator;

fn main() {
    let example = 0;
    match example {
        // all scenarios in turn
        0 => {
            for scenario in PropagationExample::iter() {
                scenario.run();
            }
        }
        1 => PropagationExample::IdentityScaling.run(),
        2 => PropagationExample::CorrelatedSystem.run(),
        3 => PropagationExample::TwoFunctions.run(),
        _ => {
            println!("example not found");
        }
    }
}
