use cover_app_contract::{AppCommand, AppHost, AppInput, AppMountContext, AppServices, ApplicationId};

const PROMPT: &str = "C:\\Users\\JohnDoe>";

/// Placeholder command prompt. `bsod` is the player-reachable crash signal.
#[derive(Debug)]
pub struct TerminalApp {
    services: Option<AppServices>,
    history: Vec<String>,
    line: String,
}

impl Default for TerminalApp {
    fn default() -> Self {
        Self {
            services: None,
            history: vec![
                "Microsoft Windows [Version 10.0.19045.3693]".to_string(),
                "(c) Microsoft Corporation. All rights reserved.".to_string(),
                String::new(),
            ],
            line: String::new(),
        }
    }
}

impl TerminalApp {
    pub fn history(&self) -> &[String] {
        &self.history
    }

    fn send(&self, command: AppCommand) {
        if let Some(services) = self.services.as_ref() {
            services.send(command);
        }
    }

    fn run(&mut self, line: &str) {
        self.history.push(format!("{PROMPT}{line}"));
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        match command.to_ascii_lowercase().as_str() {
            "" => {}
            "help" => self
                .history
                .push("help, cls, echo, open <app>, bsod, exit".to_string()),
            "cls" => self.history.clear(),
            "echo" => self.history.push(rest.to_string()),
            "open" => match ApplicationId::new(rest.trim()) {
                Ok(app_id) => self.send(AppCommand::OpenApp(app_id)),
                Err(err) => self.history.push(err.to_string()),
            },
            "bsod" | "crash" => self.send(AppCommand::RequestCrash),
            "exit" => self.send(AppCommand::CloseWindow),
            other => self.history.push(format!(
                "'{other}' is not recognized as an internal or external command."
            )),
        }
    }
}

impl AppHost for TerminalApp {
    fn mount(&mut self, ctx: AppMountContext) {
        self.services = Some(ctx.services);
    }

    fn handle_input(&mut self, input: &AppInput) {
        match input {
            AppInput::Submit(line) => self.run(line),
            AppInput::Key(key) if key == "Enter" => {
                let line = std::mem::take(&mut self.line);
                self.run(&line);
            }
            AppInput::Key(key) if key == "Backspace" => {
                self.line.pop();
            }
            AppInput::Key(key) if key.chars().count() == 1 => self.line.push_str(key),
            AppInput::Key(_) => {}
        }
    }
}
