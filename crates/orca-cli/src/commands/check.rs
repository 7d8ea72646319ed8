use orca_security::{CommandValidator, HookDecision};

/// Check `command` and print the verdict. Returns whether it is allowed.
pub fn run(validator: &dyn CommandValidator, command: &str) -> bool {
    let decision = validator.validate(command);
    println!("{}", verdict(&decision));
    decision.is_allowed()
}

fn verdict(decision: &HookDecision) -> String {
    match decision {
        HookDecision::Allow => "allowed".to_string(),
        HookDecision::Deny { reason } => format!("denied: {reason}"),
    }
}
