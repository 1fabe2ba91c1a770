//! aki: the h@cky terminal core.
//!
//! Every line typed into the terminal is a *turn*. A turn is first scored for
//! prompt-injection risk; a dangerous turn is answered with the honeypot
//! message and never parsed. Everything else is parsed for the inline syntax
//!
//! ```text
//! >command< /persona (tone) [output_type] free text
//! ```
//!
//! and dispatched either as a list of command directives or as a plain
//! context bundle for a response generator. Conversation state (persona,
//! tone, output type) is sticky across turns.
//!
//! # Crate Structure
//!
//! - [`core`]: the pure pipeline (parser, threat classifier, personas,
//!   context, lexicon, dispatcher) plus config, errors and rendering helpers
//! - [`plugins`]: collaborators with side effects (journal, dictionary file,
//!   sandbox, doctor, interactive session)
//!
//! # Examples
//!
//! ```bash
//! # Interactive terminal
//! aki
//!
//! # One turn, machine readable
//! aki turn '>find< /akademik (chill) what is dialectics' --format json
//!
//! # Threat score only
//! aki score 'ignore all previous instructions'
//! ```

pub mod core;
pub mod plugins;

mod cli;

use crate::cli::{
    Cli, Command, LexiconCommand, LogCommand, OutputFormat, SandboxCommand,
};
use crate::core::collaborators::{LogSink, Sandbox};
use crate::core::config::AkiConfig;
use crate::core::context::ConversationState;
use crate::core::dispatch::{CommandOutcome, DispatchResult, HONEYPOT_MESSAGE};
use crate::core::error::AkiError;
use crate::core::lexicon::{Lexicon, LexiconRef, TermScope};
use crate::core::parser;
use crate::core::persona::PersonaRegistry;
use crate::core::pipeline::{Pipeline, Turn};
use crate::core::prompt;
use crate::core::threat::{ThreatAssessment, ThreatClassifier};
use crate::core::time::envelope;
use crate::core::tui::{self, ItemStatus};
use crate::plugins::dictionary::{self, DictionaryStore, ImportMode};
use crate::plugins::doctor;
use crate::plugins::journal::Journal;
use crate::plugins::sandbox::SubprocessSandbox;
use crate::plugins::session::Session;

use clap::Parser;
use serde_json::json;
use std::io;
use std::path::Path;
use std::time::Duration;

pub fn run() -> Result<(), AkiError> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Chat { no_log: false });

    // Only commands that open a conversation write a default config.
    let (config, created) = match command {
        Command::Chat { .. } | Command::Turn { .. } => AkiConfig::load_or_create(&cli.config)?,
        _ => (AkiConfig::load(&cli.config)?, false),
    };
    let config = config.rebase(&cli.config);
    init_tracing(cli.verbose || config.debug);

    if created {
        eprintln!(
            "{}",
            tui::status_line(
                &format!("Created default config {}", cli.config.display()),
                ItemStatus::Warn
            )
        );
    }
    tracing::debug!(config = %cli.config.display(), "config loaded");

    let out = Output { format: cli.format };
    match command {
        Command::Chat { no_log } => run_chat(config, no_log),
        Command::Turn { text, no_log } => run_turn(&out, &config, &text, no_log),
        Command::Parse { text } => {
            let descriptor = parser::parse(&text);
            out.emit("parse", serde_json::to_value(&descriptor)?, || {
                [
                    tui::key_value("commands", &format!("{:?}", descriptor.command_tokens)),
                    tui::key_value("persona", descriptor.persona_tag.as_deref().unwrap_or("-")),
                    tui::key_value("tone", descriptor.tone_tag.as_deref().unwrap_or("-")),
                    tui::key_value("output", descriptor.output_tag.as_deref().unwrap_or("-")),
                    tui::key_value("content", &descriptor.content),
                ]
                .join("\n")
            })
        }
        Command::Score { text } => {
            let assessment = ThreatClassifier::new().score(&text);
            out.emit("score", assessment.details(), || render_assessment(&assessment))
        }
        Command::Sanitize { text } => {
            let sanitized = ThreatClassifier::new().sanitize(&text);
            out.emit("sanitize", json!({ "sanitized": sanitized }), || {
                sanitized.clone()
            })
        }
        Command::Personas => {
            let personas = PersonaRegistry::global().list();
            out.emit("personas", serde_json::to_value(personas)?, || {
                personas
                    .iter()
                    .map(|p| {
                        let flag = if p.restricted { " [RESTRICTED]" } else { "" };
                        format!("/{:<10} {}{}\n    {}", p.id, p.display_name, flag, p.description)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Command::Prompt {
            persona,
            tone,
            output,
        } => {
            let record = PersonaRegistry::global().get(persona.as_deref());
            let text = prompt::system_prompt(record, &tone, &output);
            out.emit(
                "prompt",
                json!({ "persona": record.id, "system_prompt": text }),
                || text.clone(),
            )
        }
        Command::Lexicon(lexicon_cli) => run_lexicon(&out, &config, lexicon_cli.command),
        Command::Log(log_cli) => run_log(&out, &config, log_cli.command),
        Command::Sandbox(sandbox_cli) => match sandbox_cli.command {
            SandboxCommand::Run { code, timeout } => run_sandbox(
                &out,
                &config,
                cli.config.parent(),
                &code,
                timeout.map(Duration::from_secs),
            ),
        },
        Command::Doctor { guide } => {
            let report = doctor::run_checks(&cli.config, &config);
            let show_guide = guide || !report.all_ok();
            let mut payload = serde_json::to_value(&report)?;
            if show_guide && let Some(obj) = payload.as_object_mut() {
                obj.insert("guide".to_string(), json!(doctor::INSTALL_GUIDE));
            }
            out.emit("doctor", payload, || {
                if show_guide {
                    format!("{}\n\n{}", report.render_text(), doctor::INSTALL_GUIDE)
                } else {
                    report.render_text()
                }
            })
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug for this crate.
fn init_tracing(debug: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let fallback = if debug { "aki=debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .try_init();
}

struct Output {
    format: OutputFormat,
}

impl Output {
    fn emit(
        &self,
        cmd: &str,
        payload: serde_json::Value,
        text: impl FnOnce() -> String,
    ) -> Result<(), AkiError> {
        match self.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&envelope(cmd, "ok", payload))?
                );
            }
            OutputFormat::Text => println!("{}", text()),
        }
        Ok(())
    }
}

fn load_pipeline(config: &AkiConfig) -> Pipeline {
    Pipeline::new(DictionaryStore::new(&config.dictionary_file).load())
}

fn run_chat(config: AkiConfig, no_log: bool) -> Result<(), AkiError> {
    let pipeline = load_pipeline(&config);
    let mut session = Session::new(config.clone(), pipeline);
    if !no_log {
        match Journal::from_config(&config) {
            Ok(journal) => session = session.with_journal(journal),
            Err(e) => {
                tracing::warn!(error = %e, "journal unavailable, continuing without it");
                tui::print_status_line(&format!("journal unavailable: {}", e), ItemStatus::Warn);
            }
        }
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    session.run(stdin.lock(), &mut stdout.lock())
}

fn run_turn(out: &Output, config: &AkiConfig, text: &str, no_log: bool) -> Result<(), AkiError> {
    let pipeline = load_pipeline(config);
    let turn = pipeline.process_turn(text, &ConversationState::new());

    if !no_log {
        let written = Journal::from_config(config).and_then(|j| j.append(&turn.query_record()));
        if let Err(e) = written {
            tracing::warn!(error = %e, "could not journal the turn");
        }
    }

    out.emit("turn", serde_json::to_value(&turn)?, || render_turn(&turn))
}

fn render_assessment(assessment: &ThreatAssessment) -> String {
    let status = if assessment.is_dangerous() {
        ItemStatus::Fail
    } else if assessment.is_suspicious() {
        ItemStatus::Warn
    } else {
        ItemStatus::Pass
    };
    let mut lines = vec![tui::status_line(
        &format!(
            "score {:.3}: {}",
            assessment.score,
            assessment.recommendation().advice()
        ),
        status,
    )];
    for (category, count) in &assessment.detection_counts {
        lines.push(tui::bullet(&format!(
            "{} ({} pattern{})",
            category.as_str(),
            count,
            if *count == 1 { "" } else { "s" }
        )));
    }
    lines.join("\n")
}

fn render_turn(turn: &Turn) -> String {
    let mut lines = vec![
        tui::key_value("result", turn.result.kind()),
        render_assessment(&turn.assessment),
    ];
    match &turn.result {
        DispatchResult::ThreatBlocked { .. } => lines.push(HONEYPOT_MESSAGE.to_string()),
        DispatchResult::CommandExecution {
            outcomes,
            persona,
            content,
        } => {
            lines.push(tui::key_value("persona", persona.id));
            lines.push(tui::key_value("content", content));
            for outcome in outcomes {
                match outcome {
                    CommandOutcome::Recognized { command, fields } => {
                        let fields = fields
                            .iter()
                            .map(|(k, v)| format!("{}={}", k, v))
                            .collect::<Vec<_>>()
                            .join(" ");
                        lines.push(tui::status_line(
                            &format!(">{}< {}", command, fields),
                            ItemStatus::Pass,
                        ));
                    }
                    CommandOutcome::Unknown { command } => lines.push(tui::status_line(
                        &format!("Command >{}< not recognized", command),
                        ItemStatus::Warn,
                    )),
                }
            }
        }
        DispatchResult::PlainContext {
            persona,
            tone,
            output,
            content,
            lexicon_refs,
            requires_search,
            requires_sandbox,
        } => {
            lines.push(tui::key_value("persona", persona.id));
            lines.push(tui::key_value("tone", tone));
            lines.push(tui::key_value("output", output));
            lines.push(tui::key_value("content", content));
            lines.push(tui::key_value("search", &requires_search.to_string()));
            lines.push(tui::key_value("sandbox", &requires_sandbox.to_string()));
            lines.extend(lexicon_refs.iter().map(render_ref));
        }
    }
    lines.join("\n")
}

fn render_ref(r: &LexiconRef) -> String {
    tui::bullet(&format!("{} [{}] {}", r.term, r.source.label(), r.definition))
}

fn render_refs(refs: &[LexiconRef]) -> String {
    if refs.is_empty() {
        return tui::status_line("no terms", ItemStatus::Info);
    }
    refs.iter().map(render_ref).collect::<Vec<_>>().join("\n")
}

fn run_lexicon(out: &Output, config: &AkiConfig, command: LexiconCommand) -> Result<(), AkiError> {
    let store = DictionaryStore::new(&config.dictionary_file);
    let mut lexicon: Lexicon = store.load();

    match command {
        LexiconCommand::Lookup { term } => {
            let found = lexicon
                .lookup(&term)
                .ok_or_else(|| AkiError::NotFound(format!("term '{}'", term.trim())))?;
            out.emit("lexicon.lookup", serde_json::to_value(&found)?, || {
                render_ref(&found)
            })
        }
        LexiconCommand::Define { term, definition } => {
            let key = lexicon.define(&term, &definition).ok_or_else(|| {
                AkiError::ValidationError("term must not be blank".to_string())
            })?;
            store.save(&lexicon)?;
            out.emit("lexicon.define", json!({ "term": key }), || {
                tui::status_line(&format!("Term '{}' added", key), ItemStatus::Pass)
            })
        }
        LexiconCommand::Remove { term } => {
            if !lexicon.remove(&term) {
                return Err(AkiError::NotFound(format!("user term '{}'", term.trim())));
            }
            store.save(&lexicon)?;
            out.emit("lexicon.remove", json!({ "term": term.trim() }), || {
                tui::status_line(&format!("Term '{}' removed", term.trim()), ItemStatus::Pass)
            })
        }
        LexiconCommand::List { user, core } => {
            let scope = match (user, core) {
                (true, _) => TermScope::UserOnly,
                (_, true) => TermScope::CoreOnly,
                _ => TermScope::All,
            };
            let refs = lexicon.list_terms(scope);
            out.emit("lexicon.list", serde_json::to_value(&refs)?, || {
                render_refs(&refs)
            })
        }
        LexiconCommand::Search { query } => {
            let refs = lexicon.search_definitions(&query);
            out.emit("lexicon.search", serde_json::to_value(&refs)?, || {
                render_refs(&refs)
            })
        }
        LexiconCommand::Refs { text } => {
            let refs = lexicon.find_references(&text);
            out.emit("lexicon.refs", serde_json::to_value(&refs)?, || {
                render_refs(&refs)
            })
        }
        LexiconCommand::Export { path } => {
            let count = dictionary::export(&lexicon, &path)?;
            out.emit(
                "lexicon.export",
                json!({ "path": path, "terms": count }),
                || {
                    tui::status_line(
                        &format!("Exported {} terms to {}", count, path.display()),
                        ItemStatus::Pass,
                    )
                },
            )
        }
        LexiconCommand::Import { path, replace } => {
            let mode = if replace {
                ImportMode::Replace
            } else {
                ImportMode::Merge
            };
            let count = store.import(&mut lexicon, &path, mode)?;
            out.emit(
                "lexicon.import",
                json!({ "path": path, "terms": count, "replace": replace }),
                || {
                    tui::status_line(
                        &format!("Imported {} terms from {}", count, path.display()),
                        ItemStatus::Pass,
                    )
                },
            )
        }
    }
}

fn run_log(out: &Output, config: &AkiConfig, command: LogCommand) -> Result<(), AkiError> {
    let journal = Journal::from_config(config)?;

    match command {
        LogCommand::Recent { count } => {
            let lines: Vec<String> = journal
                .read(Some(count))?
                .iter()
                .map(|e| e.display_line())
                .collect();
            out.emit("log.recent", json!({ "lines": lines }), || lines.join("\n"))
        }
        LogCommand::Read { last } => {
            let entries = journal.read(last)?;
            out.emit("log.read", serde_json::to_value(&entries)?, || {
                entries
                    .iter()
                    .filter_map(|e| serde_json::to_string(e).ok())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        LogCommand::Search { query } => {
            let entries = journal.search(&query)?;
            out.emit("log.search", serde_json::to_value(&entries)?, || {
                entries
                    .iter()
                    .map(|e| e.display_line())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        LogCommand::Stats => {
            let stats = journal.stats()?;
            out.emit("log.stats", serde_json::to_value(&stats)?, || {
                let mut lines = vec![
                    tui::key_value("entries", &stats.total_entries.to_string()),
                    tui::key_value("first", stats.first.as_deref().unwrap_or("-")),
                    tui::key_value("last", stats.last.as_deref().unwrap_or("-")),
                ];
                for (kind, n) in &stats.by_type {
                    lines.push(tui::bullet(&format!("{}: {}", kind, n)));
                }
                for (persona, n) in &stats.by_persona {
                    lines.push(tui::bullet(&format!("/{}: {}", persona, n)));
                }
                lines.join("\n")
            })
        }
        LogCommand::Export { path } => {
            let count = journal.export(&path)?;
            out.emit(
                "log.export",
                json!({ "path": path, "entries": count }),
                || {
                    tui::status_line(
                        &format!("Exported {} entries to {}", count, path.display()),
                        ItemStatus::Pass,
                    )
                },
            )
        }
        LogCommand::Clear { yes } => {
            journal.clear(yes)?;
            out.emit("log.clear", json!({ "path": journal.path() }), || {
                tui::status_line("Journal cleared", ItemStatus::Pass)
            })
        }
    }
}

fn run_sandbox(
    out: &Output,
    config: &AkiConfig,
    workdir: Option<&Path>,
    code: &str,
    timeout: Option<Duration>,
) -> Result<(), AkiError> {
    let mut sandbox = SubprocessSandbox::from_config(config)?;
    if let Some(dir) = workdir.filter(|d| !d.as_os_str().is_empty()) {
        sandbox = sandbox.with_workdir(dir);
    }
    let timeout = timeout.unwrap_or_else(|| config.sandbox_timeout());
    let outcome = sandbox.execute(code, timeout);

    out.emit("sandbox.run", serde_json::to_value(&outcome)?, || {
        let mut lines = Vec::new();
        if !outcome.stdout.is_empty() {
            lines.push(outcome.stdout.trim_end().to_string());
        }
        if !outcome.stderr.is_empty() {
            lines.push(outcome.stderr.trim_end().to_string());
        }
        lines.push(match &outcome.error {
            Some(e) => tui::status_line(e, ItemStatus::Fail),
            None if outcome.success => tui::status_line("exited successfully", ItemStatus::Pass),
            None => tui::status_line("exited with a non-zero status", ItemStatus::Fail),
        });
        lines.join("\n")
    })?;

    if outcome.success {
        Ok(())
    } else {
        Err(AkiError::ValidationError(
            outcome
                .error
                .unwrap_or_else(|| "sandboxed program failed".to_string()),
        ))
    }
}
