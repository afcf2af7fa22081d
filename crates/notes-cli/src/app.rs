use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{bail, Result};
use notes_shared::DocumentId;
use notes_sync::{document_path, EditEvent, Navigator, SyncController};

/// Navigation history kept in memory, standing in for a browser URL bar.
#[derive(Debug)]
pub struct History {
    entries: Mutex<Vec<String>>,
}

impl History {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: Mutex::new(vec![initial.to_string()]),
        }
    }

    pub fn current(&self) -> String {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_string())
    }

    /// Drop the current entry and return the one before it.
    pub fn back(&self) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() < 2 {
            return None;
        }
        entries.pop();
        entries.last().cloned()
    }
}

impl Navigator for History {
    fn push(&self, path: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }

    fn replace(&self, path: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.pop();
        entries.push(path.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Open(DocumentId),
    Home,
    Back,
    Title(String),
    Write(String),
    Append(String),
    Save,
    New(Option<DocumentId>),
    Delete(Option<DocumentId>),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match name {
            "ls" | "list" => Self::List,
            "open" | "o" => Self::Open(parse_id(rest)?),
            "home" => Self::Home,
            "back" => Self::Back,
            "title" | "t" => Self::Title(rest.to_string()),
            "write" | "w" => Self::Write(rest.replace("\\n", "\n")),
            "append" | "a" => Self::Append(rest.to_string()),
            "save" | "s" => Self::Save,
            "new" | "n" => Self::New(optional_id(rest)?),
            "rm" | "delete" => Self::Delete(optional_id(rest)?),
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            "" => bail!("type `help` for a list of commands"),
            other => bail!("unknown command '{}'", other),
        };
        Ok(command)
    }
}

fn parse_id(raw: &str) -> Result<DocumentId> {
    match raw.trim_start_matches('#').parse() {
        Ok(id) => Ok(id),
        Err(_) => bail!("expected a document id, got '{}'", raw),
    }
}

fn optional_id(raw: &str) -> Result<Option<DocumentId>> {
    if raw.is_empty() {
        Ok(None)
    } else {
        parse_id(raw).map(Some)
    }
}

pub const HELP: &str = "\
Commands:
  ls                 show the document tree
  open <id>          open a document
  home               close the open document
  back               go to the previous location
  title <text>       rename the open document
  write <text>       replace the content (\\n for new lines)
  append <text>      add a line to the content
  save               save now instead of waiting
  new [parent]       create a document, optionally under <parent>
  rm [id]            delete a document (the open one by default)
  quit               save pending changes and exit";

pub struct App {
    controller: SyncController,
    history: Arc<History>,
    /// Editor working copy; reset whenever a different document is opened.
    buffer: Option<EditEvent>,
}

impl App {
    pub fn new(controller: SyncController, history: Arc<History>) -> Self {
        Self {
            controller,
            history,
            buffer: None,
        }
    }

    pub fn location(&self) -> String {
        self.history.current()
    }

    pub fn controller(&self) -> &SyncController {
        &self.controller
    }

    /// Execute one command. Returns `true` when the app should quit.
    pub async fn execute(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::List => self.controller.refresh().await,
            Command::Open(id) => self.go(&document_path(id)).await,
            Command::Home => self.go("/").await,
            Command::Back => match self.history.back() {
                Some(path) => {
                    self.buffer = None;
                    self.controller.handle_route(&path).await;
                }
                None => println!("Already at the first page"),
            },
            Command::Title(title) => self.edit(|buffer| buffer.title = title)?,
            Command::Write(content) => self.edit(|buffer| buffer.content = content)?,
            Command::Append(line) => self.edit(|buffer| {
                if !buffer.content.is_empty() {
                    buffer.content.push('\n');
                }
                buffer.content.push_str(&line);
            })?,
            Command::Save => {
                match self.controller.save_now().await? {
                    Some(saved) => println!("Saved \"{}\"", saved.title),
                    None => println!("Already saved"),
                }
            }
            Command::New(parent) => {
                self.buffer = None;
                let created = self.controller.create_document(parent).await?;
                println!("Created document #{}", created.id);
            }
            Command::Delete(id) => {
                let id = id.or(self.controller.state().selected_document_id);
                self.buffer = None;
                self.controller.delete_document(id).await?;
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => {
                self.flush().await;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn go(&mut self, path: &str) {
        self.buffer = None;
        self.controller.navigate(path).await;
    }

    fn edit(&mut self, change: impl FnOnce(&mut EditEvent)) -> Result<()> {
        let state = self.controller.state();
        let Some(open) = state.open_document() else {
            bail!("no document is open");
        };

        let buffer = match self.buffer.take() {
            Some(buffer) if buffer.id == open.id => buffer,
            _ => EditEvent::from(open),
        };
        let mut buffer = buffer;
        change(&mut buffer);

        self.controller.edit(buffer.clone());
        self.buffer = Some(buffer);
        Ok(())
    }

    /// Write out an edit that is still waiting for its server sync.
    pub async fn flush(&mut self) {
        if !self.controller.pipeline().has_pending() {
            return;
        }
        match self.controller.save_now().await {
            Ok(Some(saved)) => println!("Saved \"{}\"", saved.title),
            Ok(None) => {}
            Err(e) => eprintln!("Could not save pending changes: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!("open 5".parse::<Command>().unwrap(), Command::Open(5));
        assert_eq!("o #12".parse::<Command>().unwrap(), Command::Open(12));
        assert_eq!("new".parse::<Command>().unwrap(), Command::New(None));
        assert_eq!("new 3".parse::<Command>().unwrap(), Command::New(Some(3)));
        assert_eq!(
            "title  Weekly plan ".parse::<Command>().unwrap(),
            Command::Title("Weekly plan".into())
        );
        assert_eq!(
            "write a\\nb".parse::<Command>().unwrap(),
            Command::Write("a\nb".into())
        );
        assert_eq!("rm".parse::<Command>().unwrap(), Command::Delete(None));
    }

    #[test]
    fn rejects_bad_input() {
        assert!("open".parse::<Command>().is_err());
        assert!("open five".parse::<Command>().is_err());
        assert!("frobnicate".parse::<Command>().is_err());
        assert!("   ".parse::<Command>().is_err());
    }

    #[test]
    fn history_push_replace_back() {
        let history = History::new("/");
        history.push("/documents/1");
        history.push("/documents/2");
        history.replace("/documents/1");

        assert_eq!(history.current(), "/documents/1");
        assert_eq!(history.back(), Some("/documents/1".to_string()));
        assert_eq!(history.back(), Some("/".to_string()));
        assert_eq!(history.back(), None);
    }
}
