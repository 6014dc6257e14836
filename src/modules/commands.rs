use anyhow::{bail, Result};

pub type CommandFn<C> = fn(&mut C, &str) -> Result<String>;

pub struct Command<C> {
    pub name: String,
    pub help: String,
    callback: CommandFn<C>,
}

/// Named commands run from the prompt as `/name args` (the slash is optional).
pub struct CommandRegistry<C> {
    commands: Vec<Command<C>>,
}

impl<C> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self { commands: Vec::new() }
    }
}

impl<C> CommandRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, help: &str, callback: CommandFn<C>) -> Result<()> {
        if self.find(name).is_some() {
            bail!("Command '{}' is already registered", name);
        }
        self.commands.push(Command { name: name.to_string(), help: help.to_string(), callback });
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&Command<C>> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Resolves a prompt line to its callback and argument string.
    pub fn resolve<'a>(&self, line: &'a str) -> Result<(CommandFn<C>, &'a str)> {
        let line = line.trim();
        let line = line.strip_prefix('/').unwrap_or(line);
        let (name, args) = match line.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (line, ""),
        };
        if name.is_empty() {
            bail!("No command given");
        }
        match self.find(name) {
            Some(cmd) => Ok((cmd.callback, args)),
            None => bail!("Unknown command '{}'", name),
        }
    }

    pub fn help_text(&self) -> String {
        self.commands
            .iter()
            .map(|c| format!("/{} - {}", c.name, c.help))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
