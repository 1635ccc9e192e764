//! End-to-end tests for `moo faq`, `moo csfixer`, `moo qcode` and custom commands

#![allow(clippy::unwrap_used, clippy::panic)]

use moo::GlobalArgs;
use moo::command::Command;
use moo::common::{RuntimeContext, Services};
use moo::descriptor::{ArgumentSpec, CommandDescriptor};
use moo::error::Result;
use moo::registry::Registry;
use moo_config::Config;
use moo_core::validate::RuleResult;
use moo_core::{Console, ScriptedConsole, ScriptedShell, Tone, ValidationError, ValidatorChain};
use std::fs;
use tempfile::TempDir;

const FAQS: &str = r#"
[[faqs]]
question = "How do I run the tests?"
answer = "cargo test --workspace"

[[faqs]]
question = "Where do logs go?"
answer = "stderr, or the file given with --log-file"
"#;

fn services(config: &str, console: &ScriptedConsole, shell: &ScriptedShell) -> Services {
    Services::new(
        Box::new(console.clone()),
        Box::new(shell.clone()),
        Config::from_toml_str(config).unwrap(),
    )
}

fn run(config: &str, console: &ScriptedConsole, shell: &ScriptedShell, argv: &[&str]) -> u8 {
    moo::cmd::registry()
        .dispatch(argv.iter().copied(), &mut services(config, console, shell))
        .unwrap()
}

#[test]
fn test_faq_shows_selected_answer() {
    let console = ScriptedConsole::new().choose(1);

    assert_eq!(run(FAQS, &console, &ScriptedShell::new(), &["moo", "faq"]), 0);

    assert_eq!(console.questions(), vec!["Please select a question"]);
    assert_eq!(console.lines_with(Tone::Title), vec!["Where do logs go?"]);
    assert_eq!(
        console.lines_with(Tone::Info),
        vec!["stderr, or the file given with --log-file"]
    );
}

#[test]
fn test_faq_without_questions() {
    let console = ScriptedConsole::new();

    assert_eq!(run("", &console, &ScriptedShell::new(), &["moo", "faq"]), 1);

    assert_eq!(
        console.lines_with(Tone::Error),
        vec!["Configuration error (faqs): no questions are configured"]
    );
    assert!(console.questions().is_empty());
}

#[test]
fn test_csfixer_runs_on_existing_paths() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    let missing = dir.path().join("missing");
    let shell = ScriptedShell::new().installed("php-cs-fixer");
    let console = ScriptedConsole::new();

    let code = run(
        "",
        &console,
        &shell,
        &[
            "moo",
            "csfixer",
            src.to_str().unwrap(),
            missing.to_str().unwrap(),
            "--dry",
        ],
    );

    assert_eq!(code, 0);
    let streamed = shell.streamed();
    assert_eq!(streamed.len(), 1);
    assert!(streamed[0].starts_with("php-cs-fixer fix "));
    assert!(streamed[0].contains(src.to_str().unwrap()));
    assert!(streamed[0].contains(r#"--rules='{"@PSR12":true}'"#));
    assert!(streamed[0].ends_with("--dry-run"));

    assert_eq!(
        console.lines_with(Tone::Title),
        vec![
            format!("Fixing: {}", src.display()),
            format!("Fixing: {}", missing.display()),
        ]
    );
    assert_eq!(
        console.lines_with(Tone::Warning),
        vec![format!("Path not found: {}", missing.display())]
    );
}

#[test]
fn test_csfixer_uses_configured_rules() {
    let dir = TempDir::new().unwrap();
    let shell = ScriptedShell::new().installed("php-cs-fixer");
    let console = ScriptedConsole::new();
    let config = "[csfixer.rules]\n\"@Symfony\" = true\n";

    let code = run(
        config,
        &console,
        &shell,
        &["moo", "csfixer", "-r", dir.path().to_str().unwrap()],
    );

    assert_eq!(code, 0);
    let streamed = shell.streamed();
    assert!(streamed[0].contains(r#"--rules='{"@Symfony":true}'"#));
    assert!(streamed[0].ends_with("--allow-risky=yes"));
}

#[test]
fn test_csfixer_requires_the_tool() {
    let dir = TempDir::new().unwrap();
    let shell = ScriptedShell::new();
    let console = ScriptedConsole::new();

    let code = run(
        "",
        &console,
        &shell,
        &["moo", "csfixer", dir.path().to_str().unwrap()],
    );

    assert_eq!(code, 1);
    assert!(console.lines_with(Tone::Error)[0].contains("php-cs-fixer is not installed"));
    assert!(shell.streamed().is_empty());
}

#[test]
fn test_csfixer_requires_paths() {
    let shell = ScriptedShell::new().installed("php-cs-fixer");
    let console = ScriptedConsole::new();

    assert_eq!(run("", &console, &shell, &["moo", "csfixer"]), 1);
    assert_eq!(
        console.lines_with(Tone::Error),
        vec![r#"Not enough arguments (missing: "paths")"#]
    );
}

#[test]
fn test_csfixer_self_update() {
    let shell = ScriptedShell::new();
    let console = ScriptedConsole::new();

    assert_eq!(run("", &console, &shell, &["moo", "csfixer", "--update"]), 0);

    assert_eq!(shell.streamed(), vec!["php-cs-fixer self-update"]);
    assert_eq!(
        console.lines_with(Tone::Info),
        vec!["Updating php-cs-fixer to latest version..."]
    );
}

#[test]
fn test_csfixer_failed_self_update() {
    let shell = ScriptedShell::new().respond("php-cs-fixer self-update", 1, "");
    let console = ScriptedConsole::new();

    assert_eq!(run("", &console, &shell, &["moo", "csfixer", "-u"]), 1);
    assert_eq!(
        console.lines_with(Tone::Error),
        vec!["Failed to update php-cs-fixer."]
    );
}

const MESS_REPORT: &str = r#"{"files": [{"file": "src/User.php", "violations": [
    {"beginLine": 3, "endLine": 9, "description": "Avoid unused variables."}
]}]}"#;

const ALL_TOOLS: [&str; 6] = [
    "phpmd",
    "phpcpd",
    "parallel-lint",
    "curl",
    "dephpend",
    "phpinsights",
];

fn tooled_shell() -> ScriptedShell {
    ALL_TOOLS
        .into_iter()
        .fold(ScriptedShell::new(), |shell, program| shell.installed(program))
        .respond("phpmd", 2, MESS_REPORT)
        .respond("phpcpd", 0, "No clones found.\n")
        .respond("curl", 0, "No known vulnerabilities.\n")
}

fn headings(console: &ScriptedConsole) -> Vec<String> {
    console.lines_with(Tone::Note)
}

#[test]
fn test_qcode_runs_every_analyser_without_selection() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    let shell = tooled_shell();
    let console = ScriptedConsole::new();

    let code = run("", &console, &shell, &["moo", "qcode", src.to_str().unwrap()]);

    assert_eq!(code, 0);
    assert_eq!(
        console.lines_with(Tone::Title),
        vec![format!("Analysing: {}", src.display())]
    );
    assert_eq!(
        headings(&console),
        vec![
            "[ Mess Detector ]",
            "[ Copy/Paste Detector ]",
            "[ PHP Parallel Lint ]",
            "[ PHP Static Analysis Tool ]",
            "[ dePHPend Tool ]",
            "[ PHP Insights Analysis Tool ]",
        ]
    );
    assert_eq!(
        console.lines_with(Tone::Plain),
        vec![
            "Begin line  End line  File  Note",
            "3  9  src/User.php  Avoid unused variables.",
        ]
    );
    assert_eq!(console.lines_with(Tone::Info), vec!["No clones found."]);

    let streamed = shell.streamed();
    assert_eq!(streamed.len(), 4);
    assert!(streamed[0].starts_with("parallel-lint "));
    assert!(streamed[1].contains("vendor/bin/phpstan analyse "));
    assert!(streamed[1].ends_with("--level 1 --memory-limit=5000M --ansi"));
    assert!(streamed[2].starts_with("dephpend uml "));
    assert!(streamed[2].ends_with("--keep-uml --output=qcode.png --depth=3"));
    assert!(streamed[3].starts_with("phpinsights analyse "));
}

#[test]
fn test_qcode_all_flags_match_no_flags() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().to_str().unwrap();
    let none = ScriptedConsole::new();
    let all = ScriptedConsole::new();

    run("", &none, &tooled_shell(), &["moo", "qcode", path]);
    run(
        "",
        &all,
        &tooled_shell(),
        &["moo", "qcode", "-m", "-c", "-l", "-s", "-p", "-d", "-i", path],
    );

    assert_eq!(headings(&none).len(), 6);
    assert_eq!(headings(&all), headings(&none));
}

#[test]
fn test_qcode_runs_selected_analysers_in_order() {
    let dir = TempDir::new().unwrap();
    let shell = tooled_shell();
    let console = ScriptedConsole::new();

    let code = run(
        "",
        &console,
        &shell,
        &["moo", "qcode", "--lint", "-c", dir.path().to_str().unwrap()],
    );

    assert_eq!(code, 0);
    assert_eq!(
        headings(&console),
        vec!["[ Copy/Paste Detector ]", "[ PHP Parallel Lint ]"]
    );
    assert_eq!(shell.executed().len(), 2);
}

#[test]
fn test_qcode_lock_file_only_gets_security_check() {
    let dir = TempDir::new().unwrap();
    let lock = dir.path().join("composer.lock");
    fs::write(&lock, "{}").unwrap();
    let shell = tooled_shell();
    let console = ScriptedConsole::new();

    let code = run("", &console, &shell, &["moo", "qcode", lock.to_str().unwrap()]);

    assert_eq!(code, 0);
    assert_eq!(headings(&console), vec!["[ Security Advisories Checker ]"]);
    let executed = shell.executed();
    assert_eq!(executed.len(), 1);
    assert!(executed[0].starts_with(
        "curl -H 'Accept: text/plain' https://security.sensiolabs.org/check_lock -F "
    ));
    assert!(executed[0].contains("lock=@"));
    assert_eq!(
        console.lines_with(Tone::Info),
        vec!["No known vulnerabilities."]
    );
}

#[test]
fn test_qcode_directory_with_lock_file_adds_security_check() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("composer.lock"), "{}").unwrap();
    let shell = tooled_shell();
    let console = ScriptedConsole::new();

    run(
        "",
        &console,
        &shell,
        &["moo", "qcode", "-s", "-c", dir.path().to_str().unwrap()],
    );

    assert_eq!(
        headings(&console),
        vec!["[ Copy/Paste Detector ]", "[ Security Advisories Checker ]"]
    );
    assert!(shell.executed()[1].contains("composer.lock"));
}

#[test]
fn test_qcode_skips_missing_tools() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("composer.lock"), "{}").unwrap();
    let shell = ScriptedShell::new();
    let console = ScriptedConsole::new();

    let code = run(
        "",
        &console,
        &shell,
        &["moo", "qcode", "-m", "-s", dir.path().to_str().unwrap()],
    );

    assert_eq!(code, 0);
    assert_eq!(
        console.lines_with(Tone::Warning),
        vec!["phpmd is not installed, skipping Mess Detector."]
    );
    assert_eq!(
        console.lines_with(Tone::Error),
        vec!["curl command is required for this analyser."]
    );
    assert!(shell.executed().is_empty());
}

#[test]
fn test_qcode_unreadable_mess_report() {
    let dir = TempDir::new().unwrap();
    let shell = ScriptedShell::new()
        .installed("phpmd")
        .respond("phpmd", 1, "PHP Fatal error: out of memory");
    let console = ScriptedConsole::new();

    run(
        "",
        &console,
        &shell,
        &["moo", "qcode", "-m", dir.path().to_str().unwrap()],
    );

    assert!(console.lines_with(Tone::Error)[0].starts_with("Unable to read the phpmd report"));
    assert!(console.lines_with(Tone::Plain).is_empty());
}

#[test]
fn test_qcode_configured_phpstan_command() {
    let dir = TempDir::new().unwrap();
    let shell = ScriptedShell::new();
    let console = ScriptedConsole::new();
    let config = "[qcode.phpstan]\ndefault = \"phpstan analyse {path} --level 5\"\n";

    run(
        config,
        &console,
        &shell,
        &["moo", "qcode", "-p", dir.path().to_str().unwrap()],
    );

    let streamed = shell.streamed();
    assert_eq!(streamed.len(), 1);
    assert!(streamed[0].starts_with("phpstan analyse "));
    assert!(streamed[0].ends_with(" --level 5"));
}

#[test]
fn test_qcode_disabled_phpstan_command() {
    let dir = TempDir::new().unwrap();
    let shell = ScriptedShell::new();
    let console = ScriptedConsole::new();

    run(
        "[qcode.phpstan]\ndefault = \"\"\n",
        &console,
        &shell,
        &["moo", "qcode", "-p", dir.path().to_str().unwrap()],
    );

    assert_eq!(
        console.lines_with(Tone::Error),
        vec!["There is no command to execute for base code: default"]
    );
    assert!(shell.streamed().is_empty());
}

#[test]
fn test_qcode_requires_paths() {
    let console = ScriptedConsole::new();

    assert_eq!(run("", &console, &tooled_shell(), &["moo", "qcode"]), 1);
    assert_eq!(
        console.lines_with(Tone::Error),
        vec![r#"Not enough arguments (missing: "paths")"#]
    );
}

/// Command relying entirely on the generic argument resolution
#[derive(Default)]
struct Greet;

impl Command for Greet {
    fn descriptor() -> CommandDescriptor {
        CommandDescriptor::new("greet", "Say hello")
            .argument(ArgumentSpec::required("name").prompt("Who should I greet?"))
    }

    fn validators(&self) -> ValidatorChain {
        let mut chain = ValidatorChain::new();
        chain.register_fn("name.NotEmpty", |value: String, _: &mut dyn Console| -> RuleResult {
            if value.trim().is_empty() {
                Err(ValidationError::new("Name must not be empty."))
            } else {
                Ok(value.trim().to_string())
            }
        });
        chain
    }

    fn execute(&mut self, ctx: &mut RuntimeContext<'_>) -> Result<()> {
        let name = ctx.resolved.get("name").unwrap_or_default().to_string();
        ctx.console.success(&format!("Hello {name}!"));
        Ok(())
    }
}

fn greet_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register::<Greet>();
    registry
}

#[test]
fn test_custom_command_prompts_for_missing_argument() {
    let console = ScriptedConsole::new().answer("  ").answer("Ada");
    let mut services = services("", &console, &ScriptedShell::new());

    let code = greet_registry()
        .dispatch(["moo", "greet"], &mut services)
        .unwrap();

    assert_eq!(code, 0);
    assert_eq!(console.lines_with(Tone::Question), vec!["Who should I greet?"]);
    assert_eq!(console.lines_with(Tone::Error), vec!["Name must not be empty."]);
    assert_eq!(console.lines_with(Tone::Success), vec!["Hello Ada!"]);
}

#[test]
fn test_custom_command_uses_supplied_argument() {
    let console = ScriptedConsole::new();
    let mut services = services("", &console, &ScriptedShell::new());

    let code = greet_registry()
        .dispatch(["moo", "greet", "Grace"], &mut services)
        .unwrap();

    assert_eq!(code, 0);
    assert!(console.questions().is_empty());
    assert_eq!(console.lines_with(Tone::Success), vec!["Hello Grace!"]);
}

#[test]
fn test_layered_config_drives_commit_style() {
    let dir = TempDir::new().unwrap();
    let user = dir.path().join("config.toml");
    let core = dir.path().join("core.toml");
    fs::write(
        &user,
        "[commit]\nstyle = \"imperative-mood\"\nwords = [\"Add\"]\n",
    )
    .unwrap();
    fs::write(&core, "[commit]\nstyle = \"categorised\"\n").unwrap();

    let globals = GlobalArgs {
        config: Some(user),
        core_config: Some(core),
        ..GlobalArgs::default()
    };
    let config = moo::load_config(&globals).unwrap();

    let shell = ScriptedShell::new().respond("git diff", 0, "a.php\n");
    let console = ScriptedConsole::new().confirm(true);
    let mut services = Services::new(Box::new(console.clone()), Box::new(shell.clone()), config);

    let code = moo::cmd::registry()
        .dispatch(["moo", "commit", "--csfixes"], &mut services)
        .unwrap();

    assert_eq!(code, 0);
    assert!(
        shell
            .executed()
            .contains(&"git commit -m 'Misc: apply CS fixes'".to_string())
    );
}
