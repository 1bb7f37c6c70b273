//! Application state for the TUI.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::TableState;
use resolvenow_core::analytics::CustomerSummary;
use resolvenow_core::{
    auth, Account, Complaint, ComplaintStatus, CurrentUser, Dashboard, Database, Error, MenuItem,
    Role, StatusCounts,
};

use crate::form::{Form, FormAction};

/// Entries on the landing screen
pub const LANDING_OPTIONS: [&str; 3] = ["Login", "Sign Up", "Quit"];

/// Which screen is showing
#[derive(Debug, Clone, Default)]
pub enum Screen {
    #[default]
    Landing,
    Login(Form),
    SignUp(Form),
    /// Role dashboard for the logged-in user
    Dashboard,
}

/// Modal input layered over a dashboard list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Overlay {
    #[default]
    None,
    /// Typing a message for the selected complaint
    Compose(String),
    /// Agent choosing a new status (index into `ComplaintStatus::ALL`)
    StatusPicker(usize),
    /// Admin choosing an agent (index into `App::agents`)
    AgentPicker(usize),
}

/// Toast-style notice shown under the main panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub is_error: bool,
}

impl Notice {
    fn info(title: &str, body: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            body: body.into(),
            is_error: false,
        }
    }

    fn error(err: &Error) -> Self {
        Self {
            title: err.title().to_string(),
            body: err.to_string(),
            is_error: true,
        }
    }
}

/// Main application state.
pub struct App {
    /// Database connection
    db: Database,
    /// Prefix for new complaint IDs
    id_prefix: String,
    /// Current screen
    pub screen: Screen,
    /// Highlighted landing option
    pub landing_index: usize,
    /// Logged-in user, if any
    pub user: Option<CurrentUser>,
    /// Active sidebar entry
    pub view: MenuItem,
    /// Complaints visible to the user in the active view
    pub complaints: Vec<Complaint>,
    /// Table selection state
    pub table_state: TableState,
    /// Counts for the dashboard header
    pub counts: StatusCounts,
    /// Registered agents (admin only)
    pub agents: Vec<Account>,
    /// Customer roll-up (admin only)
    pub customers: Vec<CustomerSummary>,
    /// Submission form (customer only)
    pub submit_form: Form,
    /// Active modal input
    pub overlay: Overlay,
    /// Last notice, cleared on the next key press
    pub notice: Option<Notice>,
    /// Whether the app should exit
    pub should_quit: bool,
}

impl App {
    /// Create a new app on the landing screen.
    pub fn new(db: Database, id_prefix: String) -> Self {
        Self {
            db,
            id_prefix,
            screen: Screen::Landing,
            landing_index: 0,
            user: None,
            view: MenuItem::default_for(Role::Customer),
            complaints: Vec::new(),
            table_state: TableState::default(),
            counts: StatusCounts::default(),
            agents: Vec::new(),
            customers: Vec::new(),
            submit_form: Form::complaint(),
            overlay: Overlay::None,
            notice: None,
            should_quit: false,
        }
    }

    /// Menu for the logged-in user's role
    pub fn menu(&self) -> &'static [MenuItem] {
        match &self.user {
            Some(user) => MenuItem::for_role(user.role),
            None => &[],
        }
    }

    /// True on a dashboard list with no modal input open.
    pub fn is_list_view(&self) -> bool {
        matches!(self.screen, Screen::Dashboard)
            && self.overlay == Overlay::None
            && self.view != MenuItem::SubmitComplaint
    }

    pub fn selected_complaint(&self) -> Option<&Complaint> {
        self.table_state
            .selected()
            .and_then(|i| self.complaints.get(i))
    }

    /// Reload the data behind the dashboard.
    pub fn refresh(&mut self) -> Result<()> {
        let Some(user) = self.user.clone() else {
            return Ok(());
        };
        let selected_id = self.selected_complaint().map(|c| c.id.clone());

        match Dashboard::for_user(&self.db, user, &self.id_prefix) {
            Dashboard::Customer(customer) => {
                self.complaints = customer.my_complaints()?;
                self.counts = customer.stats()?;
            }
            Dashboard::Agent(agent) => {
                self.complaints = agent.assigned_complaints()?;
                self.counts = StatusCounts::from_complaints(&self.complaints);
            }
            Dashboard::Admin(admin) => {
                self.complaints = admin.all_complaints()?;
                self.counts = admin.stats()?;
                self.agents = admin.agents()?;
                self.customers = admin.customer_summaries()?;
            }
        }

        // Newest first
        self.complaints.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        // Keep the highlight on the same complaint when rows shift
        match selected_id.and_then(|id| self.complaints.iter().position(|c| c.id == id)) {
            Some(i) => self.table_state.select(Some(i)),
            None => self.clamp_selection(),
        }
        Ok(())
    }

    fn clamp_selection(&mut self) {
        let selected = match (self.complaints.len(), self.table_state.selected()) {
            (0, _) => None,
            (len, Some(i)) => Some(i.min(len - 1)),
            (_, None) => Some(0),
        };
        self.table_state.select(selected);
    }

    fn refresh_or_notify(&mut self) {
        if let Err(e) = self.refresh() {
            tracing::warn!(error = %e, "Failed to refresh dashboard");
            self.notice = Some(Notice {
                title: "Error".to_string(),
                body: e.to_string(),
                is_error: true,
            });
        }
    }

    // ============================================
    // Key handling
    // ============================================

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        self.notice = None;
        match &self.screen {
            Screen::Landing => self.handle_landing_key(key),
            Screen::Login(_) | Screen::SignUp(_) => self.handle_auth_form_key(key),
            Screen::Dashboard => self.handle_dashboard_key(key),
        }
    }

    fn handle_landing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('l') => self.screen = Screen::Login(Form::login()),
            KeyCode::Char('s') => self.screen = Screen::SignUp(Form::sign_up()),
            KeyCode::Down | KeyCode::Char('j') => {
                self.landing_index = (self.landing_index + 1) % LANDING_OPTIONS.len();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.landing_index =
                    (self.landing_index + LANDING_OPTIONS.len() - 1) % LANDING_OPTIONS.len();
            }
            KeyCode::Enter => match self.landing_index {
                0 => self.screen = Screen::Login(Form::login()),
                1 => self.screen = Screen::SignUp(Form::sign_up()),
                _ => self.should_quit = true,
            },
            _ => {}
        }
    }

    fn handle_auth_form_key(&mut self, key: KeyEvent) {
        let action = match &mut self.screen {
            Screen::Login(form) | Screen::SignUp(form) => form.handle_key(key),
            _ => return,
        };

        match action {
            FormAction::None => {}
            FormAction::Cancel => self.screen = Screen::Landing,
            FormAction::Submit => match &self.screen {
                Screen::Login(form) => {
                    let form = form.clone();
                    self.submit_login(&form);
                }
                Screen::SignUp(form) => {
                    let form = form.clone();
                    self.submit_sign_up(&form);
                }
                _ => {}
            },
        }
    }

    fn submit_login(&mut self, form: &Form) {
        let role = form.role();
        match auth::login(&self.db, &form.text("Email"), &form.text("Password"), role) {
            Ok(user) => {
                self.notice = Some(Notice::info(
                    "Welcome",
                    format!("Logged in as {} ({})", user.name, role.display_name()),
                ));
                self.user = Some(user);
                self.view = MenuItem::default_for(role);
                self.overlay = Overlay::None;
                self.table_state = TableState::default();
                self.submit_form = Form::complaint();
                self.screen = Screen::Dashboard;
                self.refresh_or_notify();
            }
            Err(e) => self.notice = Some(Notice::error(&e)),
        }
    }

    fn submit_sign_up(&mut self, form: &Form) {
        let account = form.to_new_account();
        if account.name.is_empty() || account.email.is_empty() || account.password.is_empty() {
            self.notice = Some(Notice::error(&Error::MissingField(
                "name, email and password",
            )));
            return;
        }

        let email = account.email.clone();
        match auth::sign_up(&self.db, account) {
            Ok(()) => {
                tracing::info!(email = %email, "Account created from TUI");
                self.notice = Some(Notice::info(
                    "Account Created",
                    "Please login with your credentials",
                ));
                self.screen = Screen::Login(Form::login());
            }
            Err(e) => self.notice = Some(Notice::error(&e)),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match self.overlay.clone() {
            Overlay::Compose(text) => return self.handle_compose_key(key, text),
            Overlay::StatusPicker(index) => return self.handle_status_picker_key(key, index),
            Overlay::AgentPicker(index) => return self.handle_agent_picker_key(key, index),
            Overlay::None => {}
        }

        if self.view == MenuItem::SubmitComplaint {
            return self.handle_submit_form_key(key);
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('o') => self.logout(),
            KeyCode::Tab => self.cycle_menu(1),
            KeyCode::BackTab => self.cycle_menu(self.menu().len().saturating_sub(1)),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if let Some(item) = self.menu().get(index) {
                    self.select_view(*item);
                }
            }
            KeyCode::Char('r') => self.refresh_or_notify(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Home | KeyCode::Char('g') => self.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.select_last(),
            KeyCode::Char('m') | KeyCode::Enter => self.open_compose(),
            KeyCode::Char('s') => self.open_status_picker(),
            KeyCode::Char('a') => self.open_agent_picker(),
            _ => {}
        }
    }

    fn cycle_menu(&mut self, step: usize) {
        let menu = self.menu();
        if menu.is_empty() {
            return;
        }
        let current = menu.iter().position(|m| *m == self.view).unwrap_or(0);
        self.select_view(menu[(current + step) % menu.len()]);
    }

    fn select_view(&mut self, item: MenuItem) {
        self.view = item;
        self.overlay = Overlay::None;
        self.refresh_or_notify();
    }

    fn logout(&mut self) {
        if let Some(user) = &self.user {
            tracing::info!(email = %user.email, "Logged out");
        }
        self.user = None;
        self.complaints.clear();
        self.agents.clear();
        self.customers.clear();
        self.counts = StatusCounts::default();
        self.table_state = TableState::default();
        self.overlay = Overlay::None;
        self.landing_index = 0;
        self.screen = Screen::Landing;
    }

    fn handle_submit_form_key(&mut self, key: KeyEvent) {
        match self.submit_form.handle_key(key) {
            FormAction::None => {}
            FormAction::Cancel => self.select_view(MenuItem::MyComplaints),
            FormAction::Submit => self.submit_complaint(),
        }
    }

    fn submit_complaint(&mut self) {
        let Some(user) = self.user.clone() else {
            return;
        };
        let Dashboard::Customer(customer) = Dashboard::for_user(&self.db, user, &self.id_prefix)
        else {
            return;
        };

        match customer.submit(self.submit_form.to_new_complaint()) {
            Ok(complaint) => {
                self.notice = Some(Notice::info(
                    "Complaint Submitted Successfully!",
                    format!("Your complaint has been registered with ID: {}", complaint.id),
                ));
                self.submit_form = Form::complaint();
                self.select_view(MenuItem::MyComplaints);
            }
            Err(e) => self.notice = Some(Notice::error(&e)),
        }
    }

    // ============================================
    // Overlays
    // ============================================

    fn open_compose(&mut self) {
        let can_message = matches!(
            self.user.as_ref().map(|u| u.role),
            Some(Role::Customer | Role::Agent)
        );
        if can_message && self.selected_complaint().is_some() {
            self.overlay = Overlay::Compose(String::new());
        }
    }

    fn open_status_picker(&mut self) {
        if self.user.as_ref().map(|u| u.role) != Some(Role::Agent) {
            return;
        }
        if let Some(complaint) = self.selected_complaint() {
            let index = ComplaintStatus::ALL
                .iter()
                .position(|s| *s == complaint.status)
                .unwrap_or(0);
            self.overlay = Overlay::StatusPicker(index);
        }
    }

    fn open_agent_picker(&mut self) {
        if self.user.as_ref().map(|u| u.role) != Some(Role::Admin) {
            return;
        }
        if self.selected_complaint().is_none() {
            return;
        }
        if self.agents.is_empty() {
            self.notice = Some(Notice::info(
                "No Agents",
                "No agents are registered yet",
            ));
            return;
        }
        self.overlay = Overlay::AgentPicker(0);
    }

    fn handle_compose_key(&mut self, key: KeyEvent, mut text: String) {
        match key.code {
            KeyCode::Esc => self.overlay = Overlay::None,
            KeyCode::Enter => {
                self.overlay = Overlay::None;
                self.send_message(&text);
            }
            KeyCode::Backspace => {
                text.pop();
                self.overlay = Overlay::Compose(text);
            }
            KeyCode::Char(c) => {
                text.push(c);
                self.overlay = Overlay::Compose(text);
            }
            _ => {}
        }
    }

    fn handle_status_picker_key(&mut self, key: KeyEvent, index: usize) {
        let len = ComplaintStatus::ALL.len();
        match key.code {
            KeyCode::Esc => self.overlay = Overlay::None,
            KeyCode::Down | KeyCode::Char('j') => {
                self.overlay = Overlay::StatusPicker((index + 1) % len)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.overlay = Overlay::StatusPicker((index + len - 1) % len)
            }
            KeyCode::Enter => {
                self.overlay = Overlay::None;
                self.set_status(ComplaintStatus::ALL[index % len]);
            }
            _ => {}
        }
    }

    fn handle_agent_picker_key(&mut self, key: KeyEvent, index: usize) {
        let len = self.agents.len().max(1);
        match key.code {
            KeyCode::Esc => self.overlay = Overlay::None,
            KeyCode::Down | KeyCode::Char('j') => {
                self.overlay = Overlay::AgentPicker((index + 1) % len)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.overlay = Overlay::AgentPicker((index + len - 1) % len)
            }
            KeyCode::Enter => {
                self.overlay = Overlay::None;
                if let Some(agent) = self.agents.get(index) {
                    let name = agent.name.clone();
                    self.assign(&name);
                }
            }
            _ => {}
        }
    }

    // ============================================
    // Mutations
    // ============================================

    fn send_message(&mut self, text: &str) {
        let (Some(user), Some(id)) = (
            self.user.clone(),
            self.selected_complaint().map(|c| c.id.clone()),
        ) else {
            return;
        };

        let (result, recipient) = match Dashboard::for_user(&self.db, user, &self.id_prefix) {
            Dashboard::Customer(customer) => {
                (customer.send_message(&id, text), "the assigned agent")
            }
            Dashboard::Agent(agent) => (agent.send_message(&id, text), "the customer"),
            Dashboard::Admin(_) => return,
        };

        match result {
            Ok(_) => {
                self.notice = Some(Notice::info(
                    "Message Sent",
                    format!("Your message has been sent to {}", recipient),
                ));
                self.refresh_or_notify();
            }
            Err(e) => self.notice = Some(Notice::error(&e)),
        }
    }

    fn set_status(&mut self, status: ComplaintStatus) {
        let (Some(user), Some(id)) = (
            self.user.clone(),
            self.selected_complaint().map(|c| c.id.clone()),
        ) else {
            return;
        };
        let Dashboard::Agent(agent) = Dashboard::for_user(&self.db, user, &self.id_prefix) else {
            return;
        };

        match agent.set_status(&id, status) {
            Ok(_) => {
                self.notice = Some(Notice::info(
                    "Status Updated",
                    format!("Complaint {} status changed to {}", id, status),
                ));
                self.refresh_or_notify();
            }
            Err(e) => self.notice = Some(Notice::error(&e)),
        }
    }

    fn assign(&mut self, agent_name: &str) {
        let (Some(user), Some(id)) = (
            self.user.clone(),
            self.selected_complaint().map(|c| c.id.clone()),
        ) else {
            return;
        };
        let Dashboard::Admin(admin) = Dashboard::for_user(&self.db, user, &self.id_prefix) else {
            return;
        };

        match admin.assign(&id, agent_name) {
            Ok(_) => {
                self.notice = Some(Notice::info(
                    "Complaint Assigned",
                    format!("Complaint {} has been assigned to {}", id, agent_name),
                ));
                self.refresh_or_notify();
            }
            Err(e) => self.notice = Some(Notice::error(&e)),
        }
    }

    // ============================================
    // Selection
    // ============================================

    /// Select the next row in the table.
    fn select_next(&mut self) {
        if self.complaints.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < self.complaints.len() => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    /// Select the previous row in the table.
    fn select_previous(&mut self) {
        if self.complaints.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => self.complaints.len() - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    fn select_first(&mut self) {
        if !self.complaints.is_empty() {
            self.table_state.select(Some(0));
        }
    }

    fn select_last(&mut self) {
        if !self.complaints.is_empty() {
            self.table_state.select(Some(self.complaints.len() - 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use resolvenow_core::{CustomerController, NewAccount, NewComplaint};
    use std::thread;
    use std::time::Duration;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn test_app() -> App {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        for (name, email, role) in [
            ("Alice", "a@x.com", Role::Customer),
            ("Bob", "bob@x.com", Role::Agent),
            ("Root", "root@x.com", Role::Admin),
        ] {
            auth::sign_up(
                &db,
                NewAccount {
                    name: name.to_string(),
                    email: email.to_string(),
                    password: "pw".to_string(),
                    mobile: "555".to_string(),
                    role,
                },
            )
            .unwrap();
        }
        App::new(db, "CMP".to_string())
    }

    /// Log in from the landing screen; `role_steps` presses Right on the role row.
    fn login(app: &mut App, email: &str, role_steps: usize) {
        press(app, KeyCode::Char('l'));
        type_str(app, email);
        press(app, KeyCode::Tab);
        type_str(app, "pw");
        press(app, KeyCode::Tab);
        for _ in 0..role_steps {
            press(app, KeyCode::Right);
        }
        press(app, KeyCode::Enter);
    }

    #[test]
    fn test_sign_up_then_login() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('s'));
        type_str(&mut app, "Dana");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "d@x.com");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "pw");
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.screen, Screen::Login(_)));
        assert_eq!(app.notice.as_ref().unwrap().title, "Account Created");

        press(&mut app, KeyCode::Esc);
        login(&mut app, "d@x.com", 0);
        assert!(matches!(app.screen, Screen::Dashboard));
        assert_eq!(app.view, MenuItem::MyComplaints);
    }

    #[test]
    fn test_wrong_role_shows_notice() {
        let mut app = test_app();
        login(&mut app, "a@x.com", 2);

        assert!(matches!(app.screen, Screen::Login(_)));
        let notice = app.notice.as_ref().unwrap();
        assert!(notice.is_error);
        assert_eq!(notice.title, "Account Not Found");
    }

    #[test]
    fn test_submit_assign_and_resolve() {
        let mut app = test_app();

        // Customer submits
        login(&mut app, "a@x.com", 0);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.view, MenuItem::SubmitComplaint);
        type_str(&mut app, "Broken item");
        for _ in 0..3 {
            press(&mut app, KeyCode::Tab);
        }
        type_str(&mut app, "Arrived cracked");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view, MenuItem::MyComplaints);
        assert_eq!(app.complaints.len(), 1);
        assert_eq!(app.counts.pending, 1);
        press(&mut app, KeyCode::Char('o'));

        // Admin assigns to Bob
        login(&mut app, "root@x.com", 2);
        assert_eq!(app.view, MenuItem::AllComplaints);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.overlay, Overlay::AgentPicker(0));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.notice.as_ref().unwrap().title, "Complaint Assigned");
        assert_eq!(app.complaints[0].assigned_agent.as_deref(), Some("Bob"));
        assert_eq!(app.complaints[0].status, ComplaintStatus::InProgress);
        press(&mut app, KeyCode::Char('o'));

        // Agent replies and resolves
        login(&mut app, "bob@x.com", 1);
        assert_eq!(app.complaints.len(), 1);
        press(&mut app, KeyCode::Char('m'));
        type_str(&mut app, "On it");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.complaints[0].messages.len(), 2);

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.complaints[0].status, ComplaintStatus::Resolved);
        assert_eq!(app.counts.resolved, 1);
    }

    fn submit_as_alice(app: &App, title: &str) -> Complaint {
        let alice = CurrentUser {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            role: Role::Customer,
        };
        CustomerController::new(&app.db, alice, "CMP")
            .submit(NewComplaint {
                title: title.to_string(),
                description: "Details".to_string(),
                ..Default::default()
            })
            .unwrap()
    }

    #[test]
    fn test_refresh_keeps_selected_complaint() {
        let mut app = test_app();
        let first = submit_as_alice(&app, "First");
        login(&mut app, "root@x.com", 2);
        assert_eq!(app.selected_complaint().unwrap().id, first.id);

        // Another session submits a newer complaint, which sorts above
        thread::sleep(Duration::from_millis(5));
        let second = submit_as_alice(&app, "Second");
        app.refresh().unwrap();
        assert_eq!(app.complaints[0].id, second.id);
        assert_eq!(app.selected_complaint().unwrap().id, first.id);

        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);
        let first = app.db.get_complaint(&first.id).unwrap().unwrap();
        let second = app.db.get_complaint(&second.id).unwrap().unwrap();
        assert_eq!(first.assigned_agent.as_deref(), Some("Bob"));
        assert_eq!(second.assigned_agent, None);
    }

    #[test]
    fn test_refresh_clamps_when_selection_disappears() {
        let mut app = test_app();
        submit_as_alice(&app, "Only");
        login(&mut app, "root@x.com", 2);
        assert_eq!(app.table_state.selected(), Some(0));

        resolvenow_core::snapshot::import(&app.db, &Default::default()).unwrap();
        app.refresh().unwrap();
        assert!(app.complaints.is_empty());
        assert_eq!(app.table_state.selected(), None);
    }
}
