use resolvenow_core::{ComplaintStatus, Database, Role};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_data).expect("failed to create XDG_DATA_HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
        }
    }

    fn db_path(&self) -> PathBuf {
        self.xdg_data.join("resolvenow/data.db")
    }

    fn write_config(&self, contents: &str) {
        let dir = self.xdg_config.join("resolvenow");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        fs::write(dir.join("config.toml"), contents).expect("failed to write config");
    }
}

fn run_cli(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("resolvenow-cli"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_DATA_HOME", &env.xdg_data)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute resolvenow-cli: {e}"))
}

fn render_args(args: &[&str]) -> String {
    args.iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn assert_success(args: &[&str], output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if output.status.success() {
        return stdout;
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "resolvenow-cli {} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        render_args(args),
        output.status,
        stdout,
        stderr
    );
}

fn assert_failure(args: &[&str], output: &Output) -> String {
    assert!(
        !output.status.success(),
        "resolvenow-cli {} unexpectedly succeeded",
        render_args(args)
    );
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn run_ok(env: &CliTestEnv, args: &[&str]) -> String {
    let output = run_cli(env, args);
    assert_success(args, &output)
}

fn sign_up_everyone(env: &CliTestEnv) {
    for (name, email, role) in [
        ("Alice", "a@x.com", "customer"),
        ("Bob", "bob@x.com", "agent"),
        ("Root", "root@x.com", "admin"),
    ] {
        run_ok(
            env,
            &[
                "signup", "--name", name, "--email", email, "--password", "pw", "--mobile",
                "555", "--role", role,
            ],
        );
    }
}

fn submit_broken_item(env: &CliTestEnv) -> String {
    let stdout = run_ok(
        env,
        &[
            "submit",
            "--email",
            "a@x.com",
            "--password",
            "pw",
            "--role",
            "customer",
            "--title",
            "Broken item",
            "--description",
            "Arrived cracked",
            "--priority",
            "high",
        ],
    );
    stdout
        .trim()
        .rsplit(' ')
        .next()
        .expect("missing complaint id")
        .to_string()
}

#[test]
fn signup_submit_assign_resolve() {
    let env = CliTestEnv::new();
    sign_up_everyone(&env);

    let id = submit_broken_item(&env);
    assert!(id.starts_with("CMP"), "unexpected id {id}");

    let assign = [
        "assign", "--email", "root@x.com", "--password", "pw", "--role", "admin", id.as_str(), "Bob",
    ];
    let stdout = run_ok(&env, &assign);
    assert!(stdout.contains("has been assigned to Bob"));

    let message = [
        "message", "--email", "bob@x.com", "--password", "pw", "--role", "agent", id.as_str(),
        "Replacement shipped",
    ];
    run_ok(&env, &message);

    let status = [
        "status", "--email", "bob@x.com", "--password", "pw", "--role", "agent", id.as_str(),
        "resolved",
    ];
    let stdout = run_ok(&env, &status);
    assert!(stdout.contains("status changed to resolved"));

    let db = Database::open(&env.db_path()).expect("failed to open db");
    db.migrate().expect("failed to migrate db");
    let complaint = db
        .get_complaint(&id)
        .expect("failed to read complaint")
        .expect("complaint missing");
    assert_eq!(complaint.customer_email, "a@x.com");
    assert_eq!(complaint.assigned_agent.as_deref(), Some("Bob"));
    assert_eq!(complaint.status, ComplaintStatus::Resolved);
    assert_eq!(complaint.messages.len(), 2);

    let stats = [
        "stats", "--email", "a@x.com", "--password", "pw", "--role", "customer", "--format",
        "json",
    ];
    let stdout = run_ok(&env, &stats);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("stats json");
    assert_eq!(value["total"], 1);
    assert_eq!(value["resolved"], 1);
}

#[test]
fn login_errors_are_reported() {
    let env = CliTestEnv::new();
    sign_up_everyone(&env);

    let duplicate = [
        "signup", "--name", "Alice", "--email", "a@x.com", "--password", "x", "--role",
        "agent",
    ];
    let stderr = assert_failure(&duplicate, &run_cli(&env, &duplicate));
    assert!(stderr.contains("already exists"), "stderr:\n{stderr}");

    let wrong_password = ["login", "--email", "a@x.com", "--password", "nope", "--role", "customer"];
    let stderr = assert_failure(&wrong_password, &run_cli(&env, &wrong_password));
    assert!(stderr.contains("password you entered is incorrect"), "stderr:\n{stderr}");

    let wrong_role = ["login", "--email", "a@x.com", "--password", "pw", "--role", "admin"];
    let stderr = assert_failure(&wrong_role, &run_cli(&env, &wrong_role));
    assert!(stderr.contains("no account exists"), "stderr:\n{stderr}");
}

#[test]
fn roles_are_enforced() {
    let env = CliTestEnv::new();
    sign_up_everyone(&env);
    let id = submit_broken_item(&env);

    let customer_assigns = [
        "assign", "--email", "a@x.com", "--password", "pw", "--role", "customer", id.as_str(), "Bob",
    ];
    let stderr = assert_failure(&customer_assigns, &run_cli(&env, &customer_assigns));
    assert!(stderr.contains("only admins"), "stderr:\n{stderr}");

    let unassigned_status = [
        "status", "--email", "bob@x.com", "--password", "pw", "--role", "agent", id.as_str(), "closed",
    ];
    let stderr = assert_failure(&unassigned_status, &run_cli(&env, &unassigned_status));
    assert!(stderr.contains("may not modify"), "stderr:\n{stderr}");

    let list = [
        "list", "--email", "bob@x.com", "--password", "pw", "--role", "agent",
    ];
    let stdout = run_ok(&env, &list);
    assert!(stdout.contains("No complaints found."));
}

#[test]
fn export_import_round_trip_with_custom_prefix() {
    let env = CliTestEnv::new();
    env.write_config("[complaints]\nid_prefix = \"TKT\"\n");
    sign_up_everyone(&env);
    let id = submit_broken_item(&env);
    assert!(id.starts_with("TKT"), "unexpected id {id}");

    let snapshot_path = env.home.join("snapshot.json");
    let snapshot = snapshot_path.to_string_lossy().into_owned();
    let stdout = run_ok(&env, &["export", snapshot.as_str()]);
    assert!(stdout.contains("Exported 3 accounts and 1 complaints"));

    let other_db = env.home.join("other.db");
    let other = other_db.to_string_lossy().into_owned();
    let stdout = run_ok(&env, &["--db", other.as_str(), "import", snapshot.as_str()]);
    assert!(stdout.contains("Imported 3 accounts and 1 complaints"));

    let db = Database::open(&other_db).expect("failed to open imported db");
    db.migrate().expect("failed to migrate imported db");
    assert_eq!(db.list_accounts_by_role(Role::Agent).unwrap().len(), 1);
    assert!(db.get_complaint(&id).unwrap().is_some());
}

#[test]
fn info_reports_paths_and_counts() {
    let env = CliTestEnv::new();
    sign_up_everyone(&env);
    submit_broken_item(&env);

    let stdout = run_ok(&env, &["info", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("info json");
    assert_eq!(value["accounts"], 3);
    assert_eq!(value["complaints"], 1);
    assert_eq!(value["schemaVersion"], 1);
    assert!(value["databaseSizeBytes"].as_u64().unwrap_or(0) > 0);
    assert_eq!(
        value["databasePath"].as_str(),
        Some(env.db_path().to_string_lossy().as_ref())
    );
    assert!(value["logPath"]
        .as_str()
        .is_some_and(|p| p.ends_with("resolvenow/resolvenow.log")));

    let stdout = run_ok(&env, &["info"]);
    assert!(stdout.contains("Complaints: 1"), "stdout:\n{stdout}");
}

#[test]
fn import_rejects_duplicate_emails() {
    let env = CliTestEnv::new();
    sign_up_everyone(&env);

    let snapshot_path = env.home.join("dup.json");
    fs::write(
        &snapshot_path,
        r#"{"userAccounts":[
            {"name":"A","email":"a@x.com","password":"pw","mobile":"1","role":"customer"},
            {"name":"B","email":"a@x.com","password":"pw","mobile":"2","role":"agent"}
        ],"complaints":[]}"#,
    )
    .expect("failed to write snapshot");
    let snapshot = snapshot_path.to_string_lossy().into_owned();

    let import = ["import", snapshot.as_str()];
    let stderr = assert_failure(&import, &run_cli(&env, &import));
    assert!(stderr.contains("already exists"), "stderr:\n{stderr}");

    let db = Database::open(&env.db_path()).expect("failed to open db");
    db.migrate().expect("failed to migrate db");
    assert_eq!(db.list_accounts().unwrap().len(), 3);
}
