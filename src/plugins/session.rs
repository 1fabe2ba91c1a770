//! Interactive h@cky terminal.
//!
//! Reads one line at a time, answers the built-in commands itself and runs
//! every other line through the pipeline. Collaborator failures (journal,
//! search, response generation) become warning lines; they never end the
//! session.

use crate::core::collaborators::{
    ContextPreview, LogSink, OfflineSearch, ResponseGenerator, SearchBackend,
};
use crate::core::config::AkiConfig;
use crate::core::context::{self, ConversationState, DEFAULT_TONE};
use crate::core::dispatch::{Command, CommandOutcome, DispatchResult, HONEYPOT_MESSAGE};
use crate::core::error::AkiError;
use crate::core::persona::DEFAULT_PERSONA_ID;
use crate::core::pipeline::{Pipeline, Turn};
use crate::core::prompt;
use crate::core::record::{LogBody, LogEntry};
use crate::core::time::new_session_id;
use crate::core::tui::{self, ItemStatus};
use crate::plugins::journal::Journal;
use colored::Colorize;
use std::io::{BufRead, Write};

const RECENT_LOG_LINES: usize = 10;

const HELP: &str = "\
SYNTAX:
  >command< /persona (tone) [output_type] content

COMMANDS:
  >explain<             metaphor explanation
  >get<                 fill database with requirements
  >find<                quick internet search
  >investigate<         deep investigation
  >deepscan<            legitimacy check
  >decrypt<             verify truth of a claim
  >bamn<                by any means necessary
  >academic search<     validated academic databases
  >juridical research<  legal databases

TONES:
  (chill) (serious) (solemn) (happy) (sad)

OUTPUT TYPES:
  [concise] [precise] [based] (default) [developed]

SYSTEM COMMANDS:
  help  personas  status  config  log  clear  exit/quit";

const DISCLAIMERS: &[(&str, &str)] = &[
    (
        "Legality",
        "h@cky follows international ethics, not specific national laws. \
         Legal compliance in your jurisdiction is your responsibility.",
    ),
    (
        "Resource consumption",
        "AI operations consume energy. Consider the environmental impact.",
    ),
    (
        "Non-humanity",
        "h@cky is a TOOL/MACHINE, not human. It acts as a terminal for CI assistance.",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

pub struct Session {
    id: String,
    config: AkiConfig,
    pipeline: Pipeline,
    state: ConversationState,
    journal: Option<Journal>,
    generator: Box<dyn ResponseGenerator>,
    search: Box<dyn SearchBackend>,
}

impl Session {
    pub fn new(config: AkiConfig, pipeline: Pipeline) -> Self {
        Self {
            id: new_session_id(),
            generator: Box::new(ContextPreview {
                verbose: config.debug,
            }),
            config,
            pipeline,
            state: ConversationState::new(),
            journal: None,
            search: Box::new(OfflineSearch),
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn with_generator(mut self, generator: Box<dyn ResponseGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_search(mut self, search: Box<dyn SearchBackend>) -> Self {
        self.search = search;
        self
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn journal(&self) -> Option<&Journal> {
        self.journal.as_ref()
    }

    /// `h@cky/persona(tone) → `, omitting defaults.
    pub fn prompt(&self) -> String {
        let mut p = String::from("h@cky");
        if let Some(id) = self.state.current_persona_id.as_deref()
            && !id.eq_ignore_ascii_case(DEFAULT_PERSONA_ID)
        {
            p.push('/');
            p.push_str(id);
        }
        if self.state.current_tone != DEFAULT_TONE {
            p.push_str(&format!("({})", self.state.current_tone));
        }
        format!("{} {} ", p.green(), "→".yellow())
    }

    /// Drive the session until `exit`/`quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<(), AkiError> {
        writeln!(out, "{}", tui::banner(env!("CARGO_PKG_VERSION")))?;
        self.write_status_bar(out)?;
        self.write_disclaimers(out)?;
        writeln!(out, "{}", "\nType 'help' for commands, 'exit' to quit\n".cyan())?;
        self.log(LogEntry::event(
            "session_start",
            serde_json::json!({ "session": self.id }),
        ), out)?;

        let mut lines = input.lines();
        loop {
            write!(out, "{}", self.prompt())?;
            out.flush()?;
            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };
            if self.handle_line(&line?, out)? == Control::Exit {
                break;
            }
        }

        self.log(LogEntry::event(
            "session_end",
            serde_json::json!({ "session": self.id, "turns": self.state.turn_count }),
        ), out)?;
        writeln!(out, "{}", "Shutting down h@cky...".cyan())?;
        Ok(())
    }

    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Control, AkiError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Control::Continue);
        }

        match trimmed.to_lowercase().as_str() {
            "exit" | "quit" => return Ok(Control::Exit),
            "help" => writeln!(out, "{}\n{}\n", tui::section("h@cky COMMAND REFERENCE"), HELP)?,
            "clear" => {
                write!(out, "\x1B[2J\x1B[1;1H")?;
                self.write_status_bar(out)?;
            }
            "personas" => self.write_personas(out)?,
            "status" => self.write_status(out)?,
            "config" => self.write_config(out)?,
            "log" => self.write_recent_log(out)?,
            _ => self.handle_turn(line, out)?,
        }
        Ok(Control::Continue)
    }

    fn handle_turn<W: Write>(&mut self, line: &str, out: &mut W) -> Result<(), AkiError> {
        let turn = self.pipeline.process_turn(line, &self.state);

        if let Some(tag) = turn.descriptor.as_ref().and_then(|d| d.persona_tag.as_deref()) {
            let personas = self.pipeline.personas();
            if personas.is_restricted(tag) {
                let record = personas.get(Some(tag));
                let msg = format!(
                    "persona /{} is restricted{}",
                    record.id,
                    if record.requires_auth {
                        " and requires authorization"
                    } else {
                        ""
                    }
                );
                writeln!(out, "{}", tui::status_line(&msg, ItemStatus::Warn))?;
                self.log(LogEntry::event(
                    "restricted_persona",
                    serde_json::json!({ "persona": record.id }),
                ), out)?;
            } else if !personas.contains(tag) {
                tracing::debug!(tag, "unknown persona, using core");
            }
        }

        self.log(turn.query_record(), out)?;
        self.state = turn.state.clone();
        writeln!(out)?;

        match &turn.result {
            DispatchResult::ThreatBlocked { assessment } => {
                writeln!(out, "{}", HONEYPOT_MESSAGE.bright_red().bold())?;
                writeln!(
                    out,
                    "{}",
                    tui::status_line(
                        &format!(
                            "threat score {:.3} ({})",
                            assessment.score,
                            assessment.recommendation().advice()
                        ),
                        ItemStatus::Fail
                    )
                )?;
                self.log(LogEntry::event("threat_blocked", assessment.details()), out)?;
            }
            DispatchResult::CommandExecution { outcomes, .. } => {
                self.write_command_results(&turn, outcomes, out)?;
            }
            DispatchResult::PlainContext { .. } => self.write_plain_context(&turn, out)?,
        }
        writeln!(out)?;
        Ok(())
    }

    fn write_command_results<W: Write>(
        &mut self,
        turn: &Turn,
        outcomes: &[CommandOutcome],
        out: &mut W,
    ) -> Result<(), AkiError> {
        writeln!(out, "{}", "=== COMMAND EXECUTION ===".cyan())?;
        let content = turn
            .descriptor
            .as_ref()
            .map(|d| d.content.as_str())
            .unwrap_or_default();

        for outcome in outcomes {
            writeln!(out, "\n{}", format!(">{}<", outcome.command()).yellow())?;
            match outcome {
                CommandOutcome::Recognized { fields, .. } => {
                    for (key, value) in fields {
                        writeln!(out, "{}", tui::key_value(key, &value.to_string()))?;
                    }
                }
                CommandOutcome::Unknown { command } => {
                    writeln!(
                        out,
                        "{}",
                        tui::status_line(
                            &format!("Command >{}< not recognized", command),
                            ItemStatus::Warn
                        )
                    )?;
                }
            }

            let Some(cmd) = Command::from_token(outcome.command()) else {
                continue;
            };
            if cmd.requires_search() {
                self.run_search(cmd, content, out)?;
            }
            if cmd.requires_sandbox() {
                writeln!(
                    out,
                    "{}",
                    tui::status_line(
                        "requires sandbox execution; network probes are not run from a session",
                        ItemStatus::Info
                    )
                )?;
            }
        }
        Ok(())
    }

    fn run_search<W: Write>(&mut self, cmd: Command, query: &str, out: &mut W) -> Result<(), AkiError> {
        let databases = match cmd {
            Command::AcademicSearch => self.config.academic_databases.clone(),
            Command::JuridicalResearch => self.config.juridical_databases.clone(),
            _ => Vec::new(),
        };
        match self.search.search(query, &databases) {
            Ok(hits) => {
                writeln!(
                    out,
                    "{}",
                    tui::status_line(&format!("{} result(s)", hits.len()), ItemStatus::Pass)
                )?;
                for hit in hits {
                    writeln!(out, "{}", tui::bullet(&format!("{} <{}>", hit.title, hit.url)))?;
                }
            }
            Err(e) => {
                tracing::warn!(command = cmd.name(), error = %e, "search failed");
                writeln!(out, "{}", tui::status_line(&e.to_string(), ItemStatus::Warn))?;
                self.log(LogEntry::error("search", &e.to_string(), serde_json::json!({
                    "command": cmd.name(),
                    "databases": databases,
                })), out)?;
            }
        }
        Ok(())
    }

    fn write_plain_context<W: Write>(&mut self, turn: &Turn, out: &mut W) -> Result<(), AkiError> {
        let DispatchResult::PlainContext {
            persona,
            tone,
            output,
            content,
            lexicon_refs,
            ..
        } = &turn.result
        else {
            return Ok(());
        };

        writeln!(out, "{}", "[RESPONSE CONTEXT]".cyan())?;
        writeln!(out, "{}", tui::key_value("persona", persona.display_name))?;
        writeln!(out, "{}", tui::key_value("tone", tone))?;
        writeln!(out, "{}", tui::key_value("output", output))?;
        for r in lexicon_refs {
            writeln!(
                out,
                "{}",
                tui::bullet(&format!("{} [{}] {}", r.term, r.source.label(), r.definition))
            )?;
        }

        let system_prompt = prompt::system_prompt(persona, tone, output);
        match self.generator.generate(&system_prompt, content) {
            Ok(response) => {
                writeln!(out, "\n{}", response)?;
                self.log(LogEntry::now(LogBody::Response {
                    response,
                    persona: persona.id.to_string(),
                }), out)?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "response generation failed");
                writeln!(out, "{}", tui::status_line(&e.to_string(), ItemStatus::Fail))?;
                self.log(LogEntry::error("generate", &e.to_string(), serde_json::Value::Null), out)?;
            }
        }
        Ok(())
    }

    /// Append to the journal; a failed write becomes a warning line.
    fn log<W: Write>(&self, entry: LogEntry, out: &mut W) -> Result<(), AkiError> {
        let Some(journal) = &self.journal else {
            return Ok(());
        };
        if let Err(e) = journal.append(&entry) {
            tracing::warn!(error = %e, kind = entry.kind(), "journal write failed");
            writeln!(
                out,
                "{}",
                tui::status_line(&format!("journal write failed: {}", e), ItemStatus::Warn)
            )?;
        }
        Ok(())
    }

    fn write_status_bar<W: Write>(&self, out: &mut W) -> Result<(), AkiError> {
        let mut parts = Vec::new();
        if self.config.show_model_info {
            parts.push(format!("Model: {}", self.config.local_model));
        }
        if self.config.show_server_info {
            parts.push(format!("Server: {}", self.config.local_server));
        }
        if parts.is_empty() {
            return Ok(());
        }
        let line = parts.join(" | ");
        writeln!(out, "{}", line.cyan())?;
        writeln!(out, "{}", "─".repeat(line.chars().count()).cyan())?;
        Ok(())
    }

    fn write_disclaimers<W: Write>(&self, out: &mut W) -> Result<(), AkiError> {
        writeln!(out, "{}", tui::section("DISCLAIMERS"))?;
        for (title, text) in DISCLAIMERS {
            writeln!(out, "  {} {}", format!("{}:", title).yellow(), text)?;
        }
        Ok(())
    }

    fn write_personas<W: Write>(&self, out: &mut W) -> Result<(), AkiError> {
        writeln!(out, "{}", tui::section("AVAILABLE PERSONAS"))?;
        for p in self.pipeline.personas().list() {
            let restricted = if p.restricted {
                " [RESTRICTED]".red().to_string()
            } else {
                String::new()
            };
            writeln!(out, "  {}{}", format!("/{}", p.id).yellow(), restricted)?;
            writeln!(out, "      {}", p.description)?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn write_status<W: Write>(&self, out: &mut W) -> Result<(), AkiError> {
        let persona = context::resolve_persona(self.pipeline.personas(), &self.state);
        writeln!(out, "{}", tui::section("SYSTEM STATUS"))?;
        writeln!(out, "{}", tui::key_value("persona", persona.id))?;
        writeln!(out, "{}", tui::key_value("tone", &self.state.current_tone))?;
        writeln!(out, "{}", tui::key_value("output", &self.state.current_output))?;
        writeln!(out, "{}", tui::key_value("turns", &self.state.turn_count.to_string()))?;
        writeln!(out, "{}", tui::key_value("model", &self.config.local_model))?;
        writeln!(out, "{}", tui::key_value("server", &self.config.local_server))?;
        writeln!(
            out,
            "{}",
            tui::key_value("user terms", &self.pipeline.lexicon().user_terms().len().to_string())
        )?;
        writeln!(out)?;
        Ok(())
    }

    fn write_config<W: Write>(&self, out: &mut W) -> Result<(), AkiError> {
        writeln!(out, "{}", tui::section("CONFIGURATION"))?;
        writeln!(out, "{}", self.config.to_toml()?)?;
        Ok(())
    }

    fn write_recent_log<W: Write>(&self, out: &mut W) -> Result<(), AkiError> {
        writeln!(out, "{}", tui::section("RECENT LOG"))?;
        match &self.journal {
            Some(journal) => {
                for line in journal.recent(RECENT_LOG_LINES) {
                    writeln!(out, "  {}", line)?;
                }
            }
            None => writeln!(
                out,
                "{}",
                tui::status_line("journal disabled", ItemStatus::Info)
            )?,
        }
        writeln!(out)?;
        Ok(())
    }
}
