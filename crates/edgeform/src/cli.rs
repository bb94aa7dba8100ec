//! Clap derive structures for the `edgeform` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.
//! Only depends on `clap` and `clap_complete` so `build.rs` can include it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// edgeform -- schema-driven editing of edge controller resources
#[derive(Debug, Parser)]
#[command(
    name = "edgeform",
    version,
    about = "Create and edit edge nodes, apps and traffic policies from the command line",
    long_about = "Edit edge controller resources through declarative schemas.\n\n\
        Every create and update is built field by field against the resource's\n\
        schema and validated locally before anything is sent to the controller.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "EDGEFORM_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller URL (overrides profile)
    #[arg(long, short = 'c', env = "EDGEFORM_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Session token (overrides keyring and profile)
    #[arg(long, env = "EDGEFORM_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "EDGEFORM_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "EDGEFORM_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "EDGEFORM_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect the registered resource schemas
    Schema(SchemaArgs),

    /// Validate a JSON document against a resource schema (offline)
    Validate(ValidateArgs),

    /// Manage edge apps
    #[command(alias = "app")]
    Apps(AppsArgs),

    /// Manage traffic policies
    #[command(alias = "tp")]
    Policies(PoliciesArgs),

    /// Inspect and edit edge nodes
    #[command(alias = "node")]
    Nodes(NodesArgs),

    /// Log in and store the session token in the system keyring
    Login(LoginArgs),

    /// Remove the stored session token
    Logout,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared edit arguments ────────────────────────────────────────────

/// Field assignments shared by every create/update command.
#[derive(Debug, Args)]
pub struct EditArgs {
    /// Start from a JSON document instead of a blank/fetched resource
    #[arg(long = "from-file", short = 'F', value_name = "PATH")]
    pub from_file: Option<PathBuf>,

    /// Set a field: `path=value` (e.g. `traffic_rules[0].priority=10`).
    /// Repeatable. Naming the next list index appends an entry.
    #[arg(long = "set", short = 's', value_name = "PATH=VALUE")]
    pub set: Vec<String>,

    /// Print the model that would be sent, without submitting
    #[arg(long)]
    pub dry_run: bool,
}

// ━━━ Schema ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: SchemaCommand,
}

#[derive(Debug, Subcommand)]
pub enum SchemaCommand {
    /// List registered resource types
    #[command(alias = "ls")]
    List,

    /// Show one schema's fields and constraints
    Show {
        /// Resource type (e.g. app, traffic-policy, node)
        resource: String,
    },
}

// ━━━ Validate ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Resource type (e.g. app, traffic-policy, node)
    pub resource: String,

    /// JSON document to validate
    #[arg(long = "from-file", short = 'F', value_name = "PATH")]
    pub from_file: PathBuf,
}

// ━━━ Apps ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AppsArgs {
    #[command(subcommand)]
    pub command: AppsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AppsCommand {
    /// Create an app
    Create(AppCreateArgs),

    /// Show an app
    #[command(alias = "get")]
    Show {
        /// App ID
        id: String,
    },

    /// Update an app
    Update {
        /// App ID
        id: String,

        #[command(flatten)]
        edit: EditArgs,
    },
}

#[derive(Debug, Args)]
pub struct AppCreateArgs {
    /// App name
    #[arg(long)]
    pub name: Option<String>,

    /// App type: container or vm
    #[arg(long = "type", value_name = "TYPE")]
    pub app_type: Option<String>,

    /// App version
    #[arg(long = "app-version", value_name = "VERSION")]
    pub app_version: Option<String>,

    /// Vendor
    #[arg(long)]
    pub vendor: Option<String>,

    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// CPU cores (1-8)
    #[arg(long)]
    pub cores: Option<String>,

    /// Memory in MB (1-16384)
    #[arg(long)]
    pub memory: Option<String>,

    /// Image source (registry reference or URL)
    #[arg(long)]
    pub source: Option<String>,

    /// Exposed port as PORT[/PROTOCOL] (repeatable)
    #[arg(long = "port", value_name = "PORT[/PROTO]")]
    pub ports: Vec<String>,

    /// EPA feature as KEY=VALUE (repeatable)
    #[arg(long = "feature", value_name = "KEY=VALUE")]
    pub features: Vec<String>,

    #[command(flatten)]
    pub edit: EditArgs,
}

// ━━━ Policies ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PoliciesArgs {
    #[command(subcommand)]
    pub command: PoliciesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PoliciesCommand {
    /// Create a traffic policy
    Create {
        #[command(flatten)]
        edit: EditArgs,
    },

    /// Show a traffic policy
    #[command(alias = "get")]
    Show {
        /// Policy ID
        id: String,
    },

    /// Update a traffic policy
    Update {
        /// Policy ID
        id: String,

        #[command(flatten)]
        edit: EditArgs,
    },
}

// ━━━ Nodes ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct NodesArgs {
    #[command(subcommand)]
    pub command: NodesCommand,
}

#[derive(Debug, Subcommand)]
pub enum NodesCommand {
    /// List nodes
    #[command(alias = "ls")]
    List,

    /// Show a node
    #[command(alias = "get")]
    Show {
        /// Node ID
        id: String,
    },

    /// Update a node
    Update {
        /// Node ID
        id: String,

        #[command(flatten)]
        edit: EditArgs,
    },

    /// Show the traffic policy bound to a node interface
    Policy {
        /// Node ID
        node: String,

        /// Interface name
        interface: String,
    },
}

// ━━━ Login ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (defaults to the profile's username, else prompts)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Password (prompts when omitted)
    #[arg(long, env = "EDGEFORM_PASSWORD", hide_env = true)]
    pub password: Option<String>,
}

// ━━━ Config ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile (prompts for anything not given)
    Init {
        /// Controller URL
        #[arg(long = "url", value_name = "URL")]
        controller: Option<String>,

        /// Username used by `login`
        #[arg(long)]
        username: Option<String>,

        /// Make this the default profile
        #[arg(long)]
        set_default: bool,
    },

    /// Show the current configuration (secrets redacted)
    Show,

    /// Print the config file path
    Path,
}

// ━━━ Completions ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
