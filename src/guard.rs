use std::io::Read;

use log::warn;
use regex::Regex;
use serde::Deserialize;

/// Payload the agent harness writes to the hook's stdin.
#[derive(Deserialize, Debug, Default)]
struct HookPayload {
    #[serde(default)]
    tool_input: ToolInput,
}

#[derive(Deserialize, Debug, Default)]
struct ToolInput {
    command: Option<String>,
}

/// Git global flags that may sit between `git` and its subcommand,
/// e.g. `git -C /path commit` or `git -c user.name=x commit`.
const GIT_INVOCATION: &str = r"\bgit(?:\s+(?:-[Cc]\s+\S+|-\S+))*\s+";

const HISTORY_SUBCOMMANDS: &str = r"(?:commit|merge|rebase|cherry-pick)\b";
const REMOTE_SUBCOMMANDS: &str = r"(?:push)\b";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    Allow,
    Deny { reason: &'static str },
}

/// Tests `command` against the two blocklist regexes. Matching anywhere in
/// the string counts, so chained commands (`cd x && git commit`) are caught.
pub(crate) fn evaluate(command: &str) -> Verdict {
    let history = Regex::new(&format!("{GIT_INVOCATION}{HISTORY_SUBCOMMANDS}")).unwrap();
    let remote = Regex::new(&format!("{GIT_INVOCATION}{REMOTE_SUBCOMMANDS}")).unwrap();

    if history.is_match(command) {
        Verdict::Deny {
            reason: "history-writing git commands (commit, merge, rebase, cherry-pick) must be run by a human",
        }
    } else if remote.is_match(command) {
        Verdict::Deny {
            reason: "git push must be run by a human",
        }
    } else {
        Verdict::Allow
    }
}

/// Reads the hook payload from `input` and returns the exit code: 0 to
/// allow, 2 to deny. On deny, two diagnostic lines go to stderr. Input that
/// is not a JSON object, or that carries no command, allows.
pub(crate) fn run(mut input: impl Read) -> anyhow::Result<i32> {
    let mut raw = String::new();
    input.read_to_string(&mut raw)?;

    let payload: HookPayload = match serde_json::from_str(&raw) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("ignoring unparseable hook payload: {e}");
            return Ok(0);
        }
    };
    let Some(command) = payload.tool_input.command else {
        warn!("hook payload carries no tool_input.command");
        return Ok(0);
    };

    match evaluate(&command) {
        Verdict::Allow => Ok(0),
        Verdict::Deny { reason } => {
            eprintln!("guard: blocked: {command}");
            eprintln!("guard: {reason}");
            Ok(2)
        }
    }
}
