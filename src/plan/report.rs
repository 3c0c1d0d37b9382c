//! Plan preview.

use std::fmt::Write;

use tracing::debug;

use super::step::Step;

/// Render the plan as one line per step, indented with a tab per level.
///
/// Each line ends with the step's execution mode. Lines are also logged at debug level.
pub fn dump_plan(plan: &Step) -> String {
    let mut out = String::new();
    write_step(&mut out, plan, 0);
    out
}

fn write_step(out: &mut String, step: &Step, depth: usize) {
    let line = format!(
        "{}{} [{}]",
        "\t".repeat(depth),
        step.description(),
        execution_mode(step)
    );
    debug!("{}", line);
    let _ = writeln!(out, "{}", line);

    for child in step.children() {
        write_step(out, child, depth + 1);
    }
}

fn execution_mode(step: &Step) -> &'static str {
    if step.is_parallel() {
        "parallel"
    } else {
        "serial"
    }
}
