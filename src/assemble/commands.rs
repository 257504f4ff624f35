//! Command-list injection, mapping, and early-kickoff setup commands

use crate::core::step::Step;

/// Early kick-off setup: check out the PR revision inside the prebuilt
/// image, guard against a stale checkout, and bootstrap the bazel config.
/// `{repo_url}`, `{repo_branch}` and `{git_hash}` are substituted.
const EARLY_SETUP_COMMANDS: [&str; 8] = [
    "echo '--- :running: Early kick-off: Checking out PR code revision'",
    "git remote add pr_repo {repo_url}",
    "git fetch pr_repo {repo_branch}",
    "git checkout pr_repo/{repo_branch}",
    // Abort if the checked-out commit is not the one that triggered the
    // build (the branch may have moved between trigger and checkout)
    "[[ \"$(git log -1 --format=\"%H\")\" == \"{git_hash}\" ]] || \
     (echo \"Quick start failed: Wrong commit hash!\" && exit 1)",
    "BAZEL_CONFIG_ONLY=1 ./ci/env/install-bazel.sh",
    "echo \"build --remote_upload_local_results=false\" >> /root/.bazelrc",
    "echo 'export PS4=\"> \"' >> ~/.bashrc",
];

/// Prepend `before` and append `after` to every step's command list.
///
/// Steps without a command list (e.g. `wait` steps) are left untouched.
pub fn inject_commands(steps: &mut [Step], before: &[String], after: &[String]) {
    for step in steps {
        if !step.has_commands() {
            continue;
        }
        let mut commands = Vec::with_capacity(before.len() + after.len());
        commands.extend_from_slice(before);
        commands.extend(step.commands());
        commands.extend_from_slice(after);
        step.set_commands(commands);
    }
}

/// Replace every command with the sequence the transform returns for it
/// (1-to-N expansion, order preserved)
pub fn map_commands<F>(steps: &mut [Step], map_fn: F)
where
    F: Fn(&str) -> Vec<String>,
{
    for step in steps {
        if !step.has_commands() {
            continue;
        }
        let commands = step
            .commands()
            .iter()
            .flat_map(|cmd| map_fn(cmd))
            .collect();
        step.set_commands(commands);
    }
}

/// Emit a human-readable progress echo before the real command
pub fn wrap_with_echo(cmd: &str) -> Vec<String> {
    vec![format!("echo '--- :arrow_forward: {cmd}'"), cmd.to_string()]
}

/// Strip a `user:` prefix from a fork branch reference. Only the first
/// colon-delimited segment is removed; the remainder keeps its colons.
pub fn clean_repo_branch(branch: &str) -> String {
    branch
        .split_once(':')
        .map(|(_, rest)| rest)
        .unwrap_or(branch)
        .to_string()
}

/// Render the early-kickoff setup command list for a PR revision
pub fn create_setup_commands(repo_url: &str, repo_branch: &str, git_hash: &str) -> Vec<String> {
    EARLY_SETUP_COMMANDS
        .iter()
        .map(|command| {
            command
                .replace("{repo_url}", repo_url)
                .replace("{repo_branch}", repo_branch)
                .replace("{git_hash}", git_hash)
        })
        .collect()
}
