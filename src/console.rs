//! Line-oriented console over the list and form screens.

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::api::CrmApi;
use crate::entity::{Entity, parse_id};
use crate::models::{Customer, Lead, Meeting, Task, User};
use crate::routes::{Route, Section, Target};
use crate::views::{Confirm, FormState, FormView, ListView, Mode};

pub const HELP: &str = "\
Commands:
  open <path>          e.g. open /customers, open /tasks/petr/new, open /meetings/3
  search <term>        filter the current list; search alone clears it
  delete <id>          delete a record from the current list
  toggle <id>          mark a task done or planned again
  set <field> <value>  change a form field; set <field> alone clears it
  save                 create or update the record in the form
  remove               delete the record in the form
  back                 return to the list
  help                 show this text
  quit                 leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(Route),
    Search(String),
    Delete(i64),
    Toggle(i64),
    Set { field: String, value: String },
    Save,
    Remove,
    Back,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command {0:?}. Type help for the list.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("No screen at {0:?}.")]
    UnknownPath(String),

    #[error("{0:?} is not a record id.")]
    InvalidId(String),
}

impl Command {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim_end_matches(['\r', '\n']).trim_start();
        if line.trim().is_empty() {
            return Ok(None);
        }

        // search keeps its term verbatim, everything else is trimmed
        let (name, raw_rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = raw_rest.trim();

        let command = match name.to_lowercase().as_str() {
            "open" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("open <path>"));
                }
                Command::Open(Route::parse(rest).ok_or_else(|| CommandError::UnknownPath(rest.to_string()))?)
            }
            "search" => Command::Search(raw_rest.to_string()),
            "delete" => Command::Delete(record_id(rest, "delete <id>")?),
            "toggle" => Command::Toggle(record_id(rest, "toggle <id>")?),
            "set" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if field.is_empty() {
                    return Err(CommandError::Usage("set <field> <value>"));
                }
                Command::Set {
                    field: field.to_string(),
                    value: value.trim().to_string(),
                }
            }
            "save" => Command::Save,
            "remove" => Command::Remove,
            "back" => Command::Back,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn record_id(value: &str, usage: &'static str) -> Result<i64, CommandError> {
    if value.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    parse_id(value).ok_or_else(|| CommandError::InvalidId(value.to_string()))
}

/// What a screen wants the console to do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Stay,
    Navigate(Route),
    Notice(String),
    Unsupported,
}

#[async_trait(?Send)]
pub trait Screen {
    fn render(&self) -> String;

    /// Where `back` leads; lists have nowhere to go.
    fn back(&self) -> Option<Route>;

    async fn handle(&mut self, command: Command, confirm: &dyn Confirm) -> Outcome;
}

#[async_trait(?Send)]
impl<E: Entity> Screen for ListView<E> {
    fn render(&self) -> String {
        render_list(self)
    }

    fn back(&self) -> Option<Route> {
        None
    }

    async fn handle(&mut self, command: Command, confirm: &dyn Confirm) -> Outcome {
        match command {
            Command::Search(term) => {
                self.set_search(term);
                Outcome::Stay
            }
            Command::Delete(id) => {
                self.delete(id, confirm).await;
                Outcome::Stay
            }
            _ => Outcome::Unsupported,
        }
    }
}

/// Task list with the done toggle on top of the generic list commands.
pub struct TaskList(pub ListView<Task>);

#[async_trait(?Send)]
impl Screen for TaskList {
    fn render(&self) -> String {
        render_list(&self.0)
    }

    fn back(&self) -> Option<Route> {
        None
    }

    async fn handle(&mut self, command: Command, confirm: &dyn Confirm) -> Outcome {
        match command {
            Command::Toggle(id) => {
                if !self.0.items().iter().any(|t| t.id == Some(id)) {
                    return Outcome::Notice(format!("No task #{} in this list.", id));
                }
                self.0.toggle_done(id).await;
                Outcome::Stay
            }
            other => self.0.handle(other, confirm).await,
        }
    }
}

#[async_trait(?Send)]
impl<E: Entity> Screen for FormView<E> {
    fn render(&self) -> String {
        render_form(self)
    }

    fn back(&self) -> Option<Route> {
        Some(self.list_route())
    }

    async fn handle(&mut self, command: Command, confirm: &dyn Confirm) -> Outcome {
        match command {
            Command::Set { field, value } => match self.update_field(&field, &value) {
                Ok(()) => Outcome::Stay,
                Err(e) => Outcome::Notice(e.to_string()),
            },
            Command::Save => self.save().await.map_or(Outcome::Stay, Outcome::Navigate),
            Command::Remove => {
                if !matches!(self.mode(), Mode::Edit(_)) {
                    return Outcome::Notice("Only a saved record can be removed.".to_string());
                }
                self.delete(confirm).await.map_or(Outcome::Stay, Outcome::Navigate)
            }
            _ => Outcome::Unsupported,
        }
    }
}

/// Builds and loads the screen behind `route`.
pub async fn open_screen(api: Arc<dyn CrmApi>, route: &Route) -> Box<dyn Screen> {
    info!("Opening {}", route);
    match route.section {
        Section::Customers => open_entity::<Customer>(api, (), &route.target).await,
        Section::Leads => open_entity::<Lead>(api, (), &route.target).await,
        Section::Meetings => open_entity::<Meeting>(api, (), &route.target).await,
        Section::Users => open_entity::<User>(api, (), &route.target).await,
        Section::Tasks(assignee) => match &route.target {
            Target::List => Box::new(TaskList(ListView::open(api, assignee).await)),
            target => open_entity::<Task>(api, assignee, target).await,
        },
    }
}

async fn open_entity<E: Entity>(api: Arc<dyn CrmApi>, scope: E::Scope, target: &Target) -> Box<dyn Screen> {
    match target {
        Target::List => Box::new(ListView::<E>::open(api, scope).await),
        Target::New => Box::new(FormView::<E>::open(api, scope, "new").await),
        Target::Record(param) => Box::new(FormView::<E>::open(api, scope, param).await),
    }
}

pub fn render_list<E: Entity>(view: &ListView<E>) -> String {
    let mut out = String::new();
    let section = E::section(view.scope());
    let _ = writeln!(out, "== {} ==  (new record: open {})", section.title(), view.new_route());

    if !view.search().is_empty() {
        let _ = writeln!(out, "search: {:?}", view.search());
    }
    if let Some(message) = view.error_message() {
        let _ = writeln!(out, "! {}", message);
    }
    if view.is_loading() {
        let _ = writeln!(out, "Loading...");
    }

    for item in view.filtered() {
        let id = item.id().map(|id| format!("#{}", id)).unwrap_or_default();
        let _ = writeln!(out, "  {:>5}  {}", id, item.row(view.lookup()));
    }

    if view.shows_empty_state() {
        let _ = writeln!(out, "{}", E::MESSAGES.empty_list);
    }
    out
}

pub fn render_form<E: Entity>(view: &FormView<E>) -> String {
    let mut out = String::new();
    let section = view.list_route().section;
    let heading = match view.mode() {
        Mode::Draft => "new".to_string(),
        Mode::Edit(id) => format!("#{}", id),
        Mode::InvalidId => "?".to_string(),
    };
    let _ = writeln!(out, "== {} / {} ==", section.title(), heading);

    if let Some(message) = view.error_message() {
        let _ = writeln!(out, "! {}", message);
    }

    match view.state() {
        FormState::Loading => {
            let _ = writeln!(out, "Loading...");
        }
        FormState::Failed => {
            let _ = writeln!(out, "The record could not be loaded. Type back to return to {}.", view.list_route());
        }
        FormState::Ready(record) => {
            for (key, value) in record.fields(view.lookup()) {
                let _ = writeln!(out, "  {:<12} {}", format!("{}:", key), value);
            }
            let references = view.references();
            if !references.customers.is_empty() {
                let choices: Vec<String> = references
                    .customers
                    .iter()
                    .filter_map(|c| c.id.map(|id| format!("{}={}", id, c.name)))
                    .collect();
                let _ = writeln!(out, "customers: {}", choices.join(", "));
            }
            if !references.users.is_empty() {
                let choices: Vec<String> = references
                    .users
                    .iter()
                    .filter_map(|u| u.id.map(|id| format!("{}={}", id, u.name)))
                    .collect();
                let _ = writeln!(out, "users: {}", choices.join(", "));
            }
            if view.is_saving() {
                let _ = writeln!(out, "Saving...");
            }
        }
    }
    out
}

/// Asks on stdin; anything but y/yes declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

/// Reads commands until `quit` or end of input, printing the active screen after each one.
pub async fn run<R, W>(
    api: Arc<dyn CrmApi>,
    start: Route,
    input: &mut R,
    output: &mut W,
    confirm: &dyn Confirm,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut screen = open_screen(api.clone(), &start).await;
    write!(output, "{}", screen.render())?;

    let mut line = String::new();
    loop {
        write!(output, "> ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(output, "{}", e)?;
                continue;
            }
        };
        debug!("Command: {:?}", command);

        let next = match command {
            Command::Quit => break,
            Command::Help => {
                writeln!(output, "{}", HELP)?;
                continue;
            }
            Command::Open(route) => Some(route),
            Command::Back => match screen.back() {
                Some(route) => Some(route),
                None => {
                    writeln!(output, "Already on a list. Use open <path> to switch.")?;
                    continue;
                }
            },
            command => match screen.handle(command, confirm).await {
                Outcome::Navigate(route) => Some(route),
                Outcome::Notice(message) => {
                    writeln!(output, "{}", message)?;
                    None
                }
                Outcome::Unsupported => {
                    writeln!(output, "Not available on this screen.")?;
                    continue;
                }
                Outcome::Stay => None,
            },
        };

        if let Some(route) = next {
            screen = open_screen(api.clone(), &route).await;
        }
        write!(output, "{}", screen.render())?;
    }

    Ok(())
}
