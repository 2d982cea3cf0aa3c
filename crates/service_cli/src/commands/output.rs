//! Table rendering shared by the commands.

use stock_core::bundle::{Report, ReportValue};

use super::eval::EvalOutput;

const RULE: &str = "----------------------------------------";

/// Print an evaluation as plain tables.
pub fn print_evaluation(out: &EvalOutput) {
    println!("{}", RULE);
    println!("{:<22} {}", "Model", out.model);
    if !out.recognised {
        println!("{:<22} {}", "", "(unrecognised selector, objective is 0)");
    }
    println!("{:<22} {:.8}", "Objective", out.objective);
    println!("{}", RULE);

    if let Some(gradient) = &out.gradient {
        println!();
        println!("{:<22} {:>16}", "Parameter", "Gradient");
        println!("{}", RULE);
        for c in gradient {
            println!("{:<22} {:>16.6e}", c.parameter, c.value);
        }
    }

    if let Some(h) = &out.hessian {
        println!();
        println!("Hessian ({0}x{0})", h.len());
        println!("{}", RULE);
        for row in h {
            let cells: Vec<String> = row.iter().map(|v| format!("{:>11.3e}", v)).collect();
            println!("{}", cells.join(" "));
        }
    }

    if let Some(report) = &out.report {
        println!();
        print_report(report);
    }

    if let Some(check) = &out.check {
        println!();
        println!(
            "Gradient check: {} (max rel err {:.2e})",
            if check.passed { "passed" } else { "FAILED" },
            check.max_relative_error
        );
        for label in &check.failures {
            println!("  mismatch: {}", label);
        }
    }
}

/// Print report entries, one line per scalar and a short summary for arrays.
pub fn print_report(report: &Report<f64>) {
    println!("{:<22} {}", "Report", "Value");
    println!("{}", RULE);
    for entry in report.entries() {
        let marker = if entry.ad { " *" } else { "" };
        println!("{:<22} {}{}", entry.name, describe(&entry.value), marker);
    }
}

fn describe(value: &ReportValue<f64>) -> String {
    match value {
        ReportValue::Scalar(v) => format!("{:.6}", v),
        ReportValue::Vector(v) => match (v.first(), v.last()) {
            (Some(first), Some(last)) => format!("[{}] {:.4} .. {:.4}", v.len(), first, last),
            _ => "[0]".to_string(),
        },
        ReportValue::Matrix { rows, cols, .. } => format!("<{}x{} matrix>", rows, cols),
    }
}
