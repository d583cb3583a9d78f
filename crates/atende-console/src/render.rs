//! Plain-text rendering for the terminal

use chrono::{DateTime, Local, Utc};

use atende::crm::{IntegrationHealth, LeadDistribution, SalesOverview, ThreadRow};
use atende::sync::Banner;
use atende::types::{
    AnalyticsSummary, Contact, LeadClassification, LeadLevel, Message, Profile, Role, UsageStats,
};

const PREVIEW_CHARS: usize = 48;

/// Cut to `max` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let cut: String = single_line.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}

fn time(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.with_timezone(&Local).format("%d/%m %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn lead_label(lead: &LeadClassification) -> String {
    format!("{} ({})", lead.level, lead.score)
}

pub fn thread_line(row: &ThreadRow) -> String {
    let thread = &row.thread;
    format!(
        "{:>8}  {:<18} {:<11}  {:<24}  {}",
        thread.id.as_str(),
        lead_label(&row.lead),
        time(thread.last_activity()),
        truncate(&thread.display_name(), 24),
        truncate(thread.last_message.as_deref().unwrap_or_default(), PREVIEW_CHARS),
    )
}

pub fn message_line(message: &Message) -> String {
    let author = match (message.role, message.is_human) {
        (Role::User, _) => "cliente",
        (Role::Assistant, true) => "atendente",
        (Role::Assistant, false) => "assistente",
    };
    let pending = if message.is_temporary() {
        " (enviando)"
    } else {
        ""
    };
    format!(
        "[{}] {}{}: {}",
        time(Some(message.created_at)),
        author,
        pending,
        message.content
    )
}

pub fn banner_line(banner: &Banner) -> String {
    if banner.retry {
        format!("! {} (use --send novamente para repetir)", banner.message)
    } else {
        format!("! {}", banner.message)
    }
}

pub fn contact_block(contact: &Contact) -> String {
    let mut lines = vec![format!("{} (#{})", contact.display_name(), contact.id)];
    if let Some(email) = &contact.email {
        lines.push(format!("  email:    {}", email));
    }
    if let Some(phone) = &contact.phone {
        lines.push(format!("  telefone: {}", phone));
    }
    if let Some(origin) = &contact.origin {
        lines.push(format!("  origem:   {}", origin));
    }
    if !contact.tags.is_empty() {
        lines.push(format!("  tags:     {}", contact.tags.join(", ")));
    }
    for note in &contact.notes {
        lines.push(format!("  nota {} [{}]: {}", note.id, time(note.created_at), note.content));
    }
    for reminder in contact.open_reminders() {
        lines.push(format!(
            "  lembrete {} [{}]: {}",
            reminder.id,
            time(reminder.due_at),
            reminder.title
        ));
    }
    lines.join("\n")
}

pub fn distribution_block(distribution: &LeadDistribution) -> String {
    let mut lines = vec![format!("Leads: {}", distribution.total)];
    for level in LeadLevel::ALL.iter().rev() {
        lines.push(format!(
            "  {:<13} {:>4}  {:>5.1}%",
            level.as_str(),
            distribution.count(*level),
            distribution.share(*level) * 100.0
        ));
    }
    lines.join("\n")
}

pub fn sales_block(sales: &SalesOverview) -> String {
    let mut lines = vec![
        format!("Vendas ({} dias)", sales.days),
        format!("  total:        R$ {:.2}", sales.total),
        format!("  pedidos:      {}", sales.orders),
        format!("  ticket médio: R$ {:.2}", sales.average_ticket),
    ];
    if let Some(best) = &sales.best_day {
        lines.push(format!(
            "  melhor dia:   {} (R$ {:.2})",
            best.date.format("%d/%m/%Y"),
            best.total
        ));
    }
    lines.join("\n")
}

pub fn summary_block(summary: &AnalyticsSummary, usage: &UsageStats) -> String {
    [
        format!("Conversas: {} ({} novas)", summary.total_threads, summary.new_threads),
        format!("Contatos:  {}", summary.total_contacts),
        format!("Conversão: {:.1}%", summary.conversion_rate * 100.0),
        format!(
            "Mensagens: {} enviadas, {} recebidas",
            usage.messages_sent, usage.messages_received
        ),
    ]
    .join("\n")
}

pub fn integrations_block(health: &IntegrationHealth) -> String {
    health
        .entries
        .iter()
        .map(|entry| {
            let state = if entry.connected { "conectada" } else { "desconectada" };
            let mut line = format!(
                "{:<16} {:<13} sync {}  evento {}",
                entry.name,
                state,
                time(entry.last_sync_at),
                time(entry.last_event_at)
            );
            if let Some(detail) = &entry.detail {
                line.push_str(&format!("  ({})", detail));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn profile_block(profile: &Profile) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    [
        format!("Nome:    {}", field(&profile.name)),
        format!("Email:   {}", field(&profile.email)),
        format!("Empresa: {}", field(&profile.company)),
        format!("Plano:   {}", field(&profile.plan)),
    ]
    .join("\n")
}
