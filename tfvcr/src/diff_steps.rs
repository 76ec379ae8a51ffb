//! Differential test steps.
//!
//! Every step that applies a configuration is followed by a plan-only step
//! running the same configuration against a second provider alias. The
//! second provider must see no changes in the state created by the first.

use crate::{
    config_view::reform_config_with_provider,
    steps::{TestCase, TestStep},
};
use std::io::Write;

/// Returns `steps` with a diff step inserted after every step that has a
/// configuration and doesn't expect an error.
///
/// One line per input step is written to `log`. A failing log doesn't stop
/// the expansion.
pub fn expand_steps<W: Write + ?Sized>(
    steps: &[TestStep],
    source_alias: &str,
    target_alias: &str,
    log: &mut W,
) -> Vec<TestStep> {
    let mut expanded = Vec::with_capacity(steps.len() * 2);

    for (index, step) in steps.iter().enumerate() {
        expanded.push(step.clone());

        let config = match (&step.config, &step.expect_error) {
            (Some(config), None) => config,
            (None, _) => {
                write_log(log, format_args!("step {}: no config, no diff step", index));
                continue;
            }
            (Some(_), Some(_)) => {
                write_log(
                    log,
                    format_args!("step {}: expects an error, no diff step", index),
                );
                continue;
            }
        };

        let reformed = reform_config_with_provider(config, source_alias, target_alias);
        write_log(
            log,
            format_args!(
                "step {}: diff step against {}\n{}",
                index, target_alias, reformed
            ),
        );

        expanded.push(diff_step(step, reformed));
    }

    tracing::debug!(
        steps = steps.len(),
        diff_steps = expanded.len() - steps.len(),
        source_alias,
        target_alias,
        "inserted diff steps"
    );

    expanded
}

/// Rewrites `test_case` so each applying step is checked against
/// `target_alias` as well.
pub fn insert_diff_steps<W: Write + ?Sized>(
    mut test_case: TestCase,
    log: &mut W,
    source_alias: &str,
    target_alias: &str,
) -> TestCase {
    write_log(
        log,
        format_args!(
            "{}: comparing {} with {}",
            test_case.name, source_alias, target_alias
        ),
    );
    test_case.steps = expand_steps(&test_case.steps, source_alias, target_alias, log);
    test_case
}

fn diff_step(step: &TestStep, config: String) -> TestStep {
    TestStep {
        config: Some(config),
        expect_error: None,
        plan_only: true,
        expect_non_empty_plan: false,
        ..step.clone()
    }
}

fn write_log<W: Write + ?Sized>(log: &mut W, line: std::fmt::Arguments<'_>) {
    if let Err(e) = writeln!(log, "{}", line) {
        tracing::warn!(error = %e, "couldn't write to the diff step log");
    }
}
