//! Keyboard-driven form state shared by the login, sign-up and submission screens.

use crossterm::event::{KeyCode, KeyEvent};
use resolvenow_core::{Category, NewAccount, NewComplaint, Priority, Role};

/// Value held by one form row.
#[derive(Debug, Clone)]
pub enum Input {
    Text { value: String, masked: bool },
    /// One of a fixed list, cycled with Left/Right
    Choice {
        options: Vec<&'static str>,
        index: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Field {
    pub label: &'static str,
    pub input: Input,
}

impl Field {
    fn text(label: &'static str) -> Self {
        Self {
            label,
            input: Input::Text {
                value: String::new(),
                masked: false,
            },
        }
    }

    fn secret(label: &'static str) -> Self {
        Self {
            label,
            input: Input::Text {
                value: String::new(),
                masked: true,
            },
        }
    }

    fn choice(label: &'static str, options: Vec<&'static str>, index: usize) -> Self {
        Self {
            label,
            input: Input::Choice { options, index },
        }
    }

    /// Text as shown on screen
    pub fn display_value(&self) -> String {
        match &self.input {
            Input::Text { value, masked: true } => "•".repeat(value.chars().count()),
            Input::Text { value, .. } => value.clone(),
            Input::Choice { options, index } => format!("◀ {} ▶", options[*index]),
        }
    }
}

/// What a key press did to the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Submit,
    Cancel,
}

#[derive(Debug, Clone)]
pub struct Form {
    pub title: &'static str,
    pub fields: Vec<Field>,
    pub focus: usize,
}

const ROLE_FIELD: &str = "Role";

impl Form {
    pub fn login() -> Self {
        Self {
            title: " Login ",
            fields: vec![
                Field::text("Email"),
                Field::secret("Password"),
                role_field(),
            ],
            focus: 0,
        }
    }

    pub fn sign_up() -> Self {
        Self {
            title: " Sign Up ",
            fields: vec![
                Field::text("Full Name"),
                Field::text("Email"),
                Field::secret("Password"),
                Field::text("Mobile"),
                role_field(),
            ],
            focus: 0,
        }
    }

    pub fn complaint() -> Self {
        let default_category = Category::ALL
            .iter()
            .position(|c| *c == Category::default())
            .unwrap_or(0);
        let default_priority = Priority::ALL
            .iter()
            .position(|p| *p == Priority::default())
            .unwrap_or(0);

        Self {
            title: " Submit New Complaint ",
            fields: vec![
                Field::text("Title"),
                Field::choice(
                    "Category",
                    Category::ALL.iter().map(|c| c.display_name()).collect(),
                    default_category,
                ),
                Field::choice(
                    "Priority",
                    Priority::ALL.iter().map(|p| p.as_str()).collect(),
                    default_priority,
                ),
                Field::text("Description"),
                Field::text("Contact Phone"),
                Field::text("Address"),
            ],
            focus: 0,
        }
    }

    /// Apply a key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % self.fields.len(),
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + self.fields.len() - 1) % self.fields.len()
            }
            code => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    edit(&mut field.input, code);
                }
            }
        }
        FormAction::None
    }

    fn field(&self, label: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.label == label)
    }

    /// Trimmed text of a text field, empty if absent
    pub fn text(&self, label: &str) -> String {
        match self.field(label).map(|f| &f.input) {
            Some(Input::Text { value, masked: true }) => value.clone(),
            Some(Input::Text { value, .. }) => value.trim().to_string(),
            _ => String::new(),
        }
    }

    fn choice_index(&self, label: &str) -> usize {
        match self.field(label).map(|f| &f.input) {
            Some(Input::Choice { index, .. }) => *index,
            _ => 0,
        }
    }

    pub fn role(&self) -> Role {
        Role::ALL[self.choice_index(ROLE_FIELD) % Role::ALL.len()]
    }

    pub fn to_new_account(&self) -> NewAccount {
        NewAccount {
            name: self.text("Full Name"),
            email: self.text("Email"),
            password: self.text("Password"),
            mobile: self.text("Mobile"),
            role: self.role(),
        }
    }

    pub fn to_new_complaint(&self) -> NewComplaint {
        NewComplaint {
            title: self.text("Title"),
            description: self.text("Description"),
            category: Category::ALL[self.choice_index("Category") % Category::ALL.len()],
            priority: Priority::ALL[self.choice_index("Priority") % Priority::ALL.len()],
            contact_phone: self.text("Contact Phone"),
            address: self.text("Address"),
        }
    }
}

fn role_field() -> Field {
    Field::choice(
        ROLE_FIELD,
        Role::ALL.iter().map(|r| r.display_name()).collect(),
        0,
    )
}

fn edit(input: &mut Input, code: KeyCode) {
    match (input, code) {
        (Input::Text { value, .. }, KeyCode::Char(c)) => value.push(c),
        (Input::Text { value, .. }, KeyCode::Backspace) => {
            value.pop();
        }
        (Input::Choice { options, index }, KeyCode::Right | KeyCode::Char(' ')) => {
            *index = (*index + 1) % options.len();
        }
        (Input::Choice { options, index }, KeyCode::Left) => {
            *index = (*index + options.len() - 1) % options.len();
        }
        _ => {}
    }
}
