use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use atende::crm::{ContactSortKey, ThreadSortKey};
use atende::types::LeadLevel;

#[derive(Parser)]
#[command(name = "atende")]
#[command(about = "Atende - inbox e CRM no terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a conversation, optionally send something, and follow it
    Chat(ChatArgs),
    /// List conversations with search, filters and sorting
    Threads(ThreadArgs),
    /// List contacts
    Contacts(ContactListArgs),
    /// Show or edit one contact
    Contact(ContactArgs),
    /// Manual lead level overrides
    #[command(subcommand)]
    Lead(LeadCommands),
    /// Usage, sales and lead overview
    Dashboard {
        /// Days of sales history
        #[arg(long, default_value = "30")]
        days: u32,
    },
    /// Integration connection status and latest events
    Integrations {
        #[arg(long, default_value = "20")]
        limit: u32,
    },
    /// Account profile
    Profile,
    /// Save the API token for later runs
    Login {
        token: String,
        /// Remember this email for the next login
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the saved API token
    Logout,
    /// Open a dashboard route such as "#/contacts/12"
    Open { route: String },
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    pub thread: String,

    /// Send this text
    #[arg(long)]
    pub send: Option<String>,

    /// Send a previously uploaded audio by id
    #[arg(long)]
    pub audio: Option<String>,

    /// Turn human takeover on or off before sending
    #[arg(long, value_enum)]
    pub takeover: Option<Toggle>,

    /// Keep following new messages for this many seconds
    #[arg(long, default_value = "0")]
    pub watch: u64,
}

#[derive(Args, Debug, Default)]
pub struct ThreadArgs {
    /// Match name or last message
    #[arg(short, long)]
    pub search: Option<String>,
    #[arg(long)]
    pub level: Option<LeadLevel>,
    #[arg(long)]
    pub origin: Option<String>,
    #[arg(long)]
    pub funnel: Option<String>,
    #[arg(long)]
    pub stage: Option<String>,
    #[arg(long)]
    pub product: Option<String>,
    #[arg(long)]
    pub automation: Option<String>,
    /// Sort column; latest activity first when unset
    #[arg(long, value_enum)]
    pub sort: Option<ThreadSortArg>,
    #[arg(long)]
    pub desc: bool,
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct ContactListArgs {
    #[arg(short, long)]
    pub search: Option<String>,
    #[arg(long)]
    pub origin: Option<String>,
    #[arg(long)]
    pub tag: Option<String>,
    #[arg(long, value_enum, default_value = "name")]
    pub sort: ContactSortArg,
    #[arg(long)]
    pub desc: bool,
}

#[derive(Args, Debug, Default)]
pub struct ContactArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub add_tag: Vec<String>,
    #[arg(long)]
    pub remove_tag: Vec<String>,
    /// Add a note
    #[arg(long)]
    pub note: Option<String>,
    #[arg(long)]
    pub delete_note: Option<String>,
    /// Create a reminder with this title (requires --due)
    #[arg(long, requires = "due")]
    pub remind: Option<String>,
    /// RFC 3339 due date, e.g. 2024-06-01T14:00:00Z
    #[arg(long)]
    pub due: Option<DateTime<Utc>>,
    /// Mark a reminder as done
    #[arg(long)]
    pub done: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum LeadCommands {
    /// Pin a level for a thread
    Set { thread: String, level: LeadLevel },
    /// Remove the pinned level
    Clear { thread: String },
    /// Show the computed classification
    Show { thread: String },
    /// List every override
    List,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(toggle: Toggle) -> Self {
        toggle == Toggle::On
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadSortArg {
    Name,
    Activity,
    Level,
    Score,
    Origin,
    Stage,
}

impl From<ThreadSortArg> for ThreadSortKey {
    fn from(arg: ThreadSortArg) -> Self {
        match arg {
            ThreadSortArg::Name => ThreadSortKey::Name,
            ThreadSortArg::Activity => ThreadSortKey::LastActivity,
            ThreadSortArg::Level => ThreadSortKey::LeadLevel,
            ThreadSortArg::Score => ThreadSortKey::LeadScore,
            ThreadSortArg::Origin => ThreadSortKey::Origin,
            ThreadSortArg::Stage => ThreadSortKey::Stage,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContactSortArg {
    #[default]
    Name,
    Email,
    Phone,
    Origin,
    Created,
}

impl From<ContactSortArg> for ContactSortKey {
    fn from(arg: ContactSortArg) -> Self {
        match arg {
            ContactSortArg::Name => ContactSortKey::Name,
            ContactSortArg::Email => ContactSortKey::Email,
            ContactSortArg::Phone => ContactSortKey::Phone,
            ContactSortArg::Origin => ContactSortKey::Origin,
            ContactSortArg::Created => ContactSortKey::CreatedAt,
        }
    }
}
