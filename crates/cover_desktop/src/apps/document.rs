use cover_app_contract::{AppHost, AppInput, AppMountContext, ContentRegion};

/// Placeholder for the office apps (spreadsheet, word processor, slides, mail, chat).
#[derive(Debug, Default)]
pub struct DocumentApp {
    region: Option<ContentRegion>,
    text: String,
}

impl DocumentApp {
    pub fn region(&self) -> Option<ContentRegion> {
        self.region
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl AppHost for DocumentApp {
    fn mount(&mut self, ctx: AppMountContext) {
        self.region = Some(ctx.region);
    }

    fn handle_input(&mut self, input: &AppInput) {
        match input {
            AppInput::Key(key) if key.chars().count() == 1 => self.text.push_str(key),
            AppInput::Key(key) if key == "Enter" => self.text.push('\n'),
            AppInput::Key(_) => {}
            AppInput::Submit(line) => {
                self.text.push_str(line);
                self.text.push('\n');
            }
        }
    }
}
