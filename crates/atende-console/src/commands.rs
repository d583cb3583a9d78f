use std::collections::HashSet;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures::future::join_all;
use tokio::sync::mpsc;

use atende::crm::{
    sort_contacts, sort_threads, ContactFilter, SortDirection, SortState, ThreadFilter,
};
use atende::prelude::Inbox;
use atende::sync::{SyncEvent, ThreadSync};
use atende::types::{
    Contact, ContactUpdate, MessageId, NewReminder, ReminderUpdate, Route, Thread, ThreadId,
};
use atende::InboxApi;

use crate::cli::{
    ChatArgs, Commands, ContactArgs, ContactListArgs, LeadCommands, ThreadArgs,
};
use crate::render;

fn direction(desc: bool) -> SortDirection {
    if desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    }
}

impl Commands {
    pub async fn execute(self, inbox: &Inbox) -> Result<()> {
        match self {
            Commands::Chat(args) => chat(inbox, args).await,
            Commands::Threads(args) => threads(inbox, args).await,
            Commands::Contacts(args) => contacts(inbox, args).await,
            Commands::Contact(args) => contact(inbox, args).await,
            Commands::Lead(command) => lead(inbox, command).await,
            Commands::Dashboard { days } => dashboard(inbox, days).await,
            Commands::Integrations { limit } => integrations(inbox, limit).await,
            Commands::Profile => profile(inbox).await,
            Commands::Login { token, email } => {
                inbox.login(&token)?;
                if let Some(email) = email {
                    inbox.session().remember_email(&email)?;
                }
                println!("Sessão salva.");
                Ok(())
            }
            Commands::Logout => {
                inbox.logout()?;
                println!("Sessão encerrada.");
                Ok(())
            }
            Commands::Open { route } => open(inbox, &route).await,
        }
    }
}

async fn open(inbox: &Inbox, raw: &str) -> Result<()> {
    let route = Route::parse(raw)?;
    tracing::debug!(route = %route, "Opening route");

    match route {
        Route::Chat => threads(inbox, ThreadArgs::default()).await,
        Route::Contacts => contacts(inbox, ContactListArgs::default()).await,
        Route::Contact(id) => {
            contact(
                inbox,
                ContactArgs {
                    id: id.to_string(),
                    ..ContactArgs::default()
                },
            )
            .await
        }
        Route::Profile => profile(inbox).await,
        Route::Dashboard => dashboard(inbox, 30).await,
        Route::Integrations => integrations(inbox, 20).await,
        Route::Products => bail!("{} is not available in the console", Route::Products),
    }
}

async fn find_thread(inbox: &Inbox, thread_id: &ThreadId) -> Result<Option<Thread>> {
    let threads = inbox
        .api()
        .list_threads()
        .await
        .context("Failed to list threads")?;
    Ok(threads.into_iter().find(|t| &t.id == thread_id))
}

async fn chat(inbox: &Inbox, args: ChatArgs) -> Result<()> {
    let thread_id = ThreadId::from(args.thread);
    let thread = find_thread(inbox, &thread_id)
        .await?
        .unwrap_or_else(|| Thread::new(thread_id.clone()));

    let (sync, mut events) = inbox.thread_sync();
    if let Err(e) = sync.select_thread(&thread).await {
        eprintln!("! {}", e.user_message());
    }

    if let Some(toggle) = args.takeover {
        sync.force_takeover(toggle.into())
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    }
    if let Some(audio) = &args.audio {
        sync.send_audio(audio)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    }
    if let Some(text) = args.send {
        sync.send_text(text)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    }

    let state = sync.snapshot().await;
    let lead = inbox.classifier().classify(&thread, &state.messages);
    println!(
        "{} | lead {} | takeover {}",
        thread.display_name(),
        render::lead_label(&lead),
        if state.takeover { "on" } else { "off" }
    );

    let mut shown: HashSet<MessageId> = HashSet::new();
    for message in &state.messages {
        println!("{}", render::message_line(message));
        shown.insert(message.id.clone());
    }

    if args.watch > 0 {
        follow(&sync, &mut events, &mut shown, Duration::from_secs(args.watch)).await;
    }
    sync.stop();
    Ok(())
}

async fn follow(
    sync: &ThreadSync,
    events: &mut mpsc::Receiver<SyncEvent>,
    shown: &mut HashSet<MessageId>,
    duration: Duration,
) {
    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Some(SyncEvent::Messages { messages, .. }) => {
                    for message in messages.iter().filter(|m| !m.is_temporary()) {
                        if shown.insert(message.id.clone()) {
                            println!("{}", render::message_line(message));
                        }
                    }
                }
                Some(SyncEvent::Typing { active: true, .. }) => println!("assistente digitando..."),
                Some(SyncEvent::Banner { banner: Some(banner), .. }) => {
                    println!("{}", render::banner_line(&banner));
                }
                Some(_) => {}
                None => break,
            },
        }
    }

    tracing::debug!(thread_id = ?sync.active_thread().await, "Stopped following");
}

async fn threads(inbox: &Inbox, args: ThreadArgs) -> Result<()> {
    let (tx, _rx) = mpsc::channel(1);
    let list = inbox.thread_list(tx);
    let rows = list.refresh().await.context("Failed to list threads")?;

    let mut filter = ThreadFilter::new();
    if let Some(search) = args.search {
        filter = filter.search(search);
    }
    if let Some(level) = args.level {
        filter = filter.lead_level(level);
    }
    if let Some(origin) = args.origin {
        filter = filter.origin(origin);
    }
    if let Some(funnel) = args.funnel {
        filter = filter.funnel(funnel);
    }
    if let Some(stage) = args.stage {
        filter = filter.stage(stage);
    }
    if let Some(product) = args.product {
        filter = filter.product(product);
    }
    if let Some(status) = args.automation {
        filter = filter.automation_status(status);
    }

    let mut visible = filter.apply(&rows);
    if let Some(sort) = args.sort {
        sort_threads(
            &mut visible,
            SortState::new(sort.into()).with_direction(direction(args.desc)),
        );
    }
    if let Some(limit) = args.limit {
        visible.truncate(limit);
    }

    for row in &visible {
        println!("{}", render::thread_line(row));
    }
    println!("{} de {} conversas", visible.len(), rows.len());
    Ok(())
}

async fn contacts(inbox: &Inbox, args: ContactListArgs) -> Result<()> {
    let api = inbox.api();
    let threads = api.list_threads().await.context("Failed to list threads")?;

    let fetched = join_all(threads.iter().map(|t| api.get_contact(&t.id))).await;
    let all: Vec<Contact> = fetched
        .into_iter()
        .filter_map(|result| match result {
            Ok(contact) => Some(contact),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping contact");
                None
            }
        })
        .collect();

    let mut filter = ContactFilter::new();
    if let Some(search) = args.search {
        filter = filter.search(search);
    }
    if let Some(origin) = args.origin {
        filter = filter.origin(origin);
    }
    if let Some(tag) = args.tag {
        filter = filter.tag(tag);
    }

    let mut visible = filter.apply(&all);
    sort_contacts(
        &mut visible,
        SortState::new(args.sort.into()).with_direction(direction(args.desc)),
    );

    for contact in &visible {
        println!(
            "{:>8}  {:<24}  {:<28}  {}",
            contact.id.as_str(),
            render::truncate(&contact.display_name(), 24),
            contact.email.as_deref().unwrap_or("-"),
            contact.phone.as_deref().unwrap_or("-"),
        );
    }
    println!("{} de {} contatos", visible.len(), all.len());
    Ok(())
}

async fn contact(inbox: &Inbox, args: ContactArgs) -> Result<()> {
    let api = inbox.api();
    let id = ThreadId::from(args.id);

    let update = ContactUpdate {
        name: args.name,
        email: args.email,
        phone: args.phone,
        origin: None,
    };
    if update != ContactUpdate::default() {
        api.update_contact(&id, update).await?;
    }
    for tag in &args.add_tag {
        api.add_tag(&id, tag).await?;
    }
    for tag in &args.remove_tag {
        api.remove_tag(&id, tag).await?;
    }
    if let Some(content) = &args.note {
        api.add_note(&id, content).await?;
    }
    if let Some(note_id) = &args.delete_note {
        api.delete_note(&id, note_id).await?;
    }
    if let (Some(title), Some(due_at)) = (args.remind, args.due) {
        api.create_reminder(&id, NewReminder { title, due_at }).await?;
    }
    if let Some(reminder_id) = &args.done {
        let done = ReminderUpdate {
            done: Some(true),
            ..ReminderUpdate::default()
        };
        api.update_reminder(&id, reminder_id, done).await?;
    }

    let contact = api.get_contact(&id).await.context("Failed to load contact")?;
    println!("{}", render::contact_block(&contact));

    match api.thread_by_contact(&id).await? {
        Some(thread) => {
            let lead = inbox.classifier().classify(&thread, &[]);
            println!("  conversa: #{} | lead {}", thread.id, render::lead_label(&lead));
        }
        None => println!("  sem conversa"),
    }
    Ok(())
}

async fn lead(inbox: &Inbox, command: LeadCommands) -> Result<()> {
    let overrides = inbox.overrides();
    match command {
        LeadCommands::Set { thread, level } => {
            let id = ThreadId::from(thread);
            overrides.set(&id, level)?;
            println!("#{} fixado como {}", id, level);
        }
        LeadCommands::Clear { thread } => {
            let id = ThreadId::from(thread);
            overrides.clear(&id)?;
            println!("#{} volta à classificação automática", id);
        }
        LeadCommands::Show { thread } => {
            let id = ThreadId::from(thread);
            let thread = find_thread(inbox, &id)
                .await?
                .unwrap_or_else(|| Thread::new(id.clone()));
            let messages = inbox.api().get_messages(&id).await.unwrap_or_default();
            let lead = inbox.classifier().classify(&thread, &messages);
            println!("#{}: {} via {:?}", id, render::lead_label(&lead), lead.source);
        }
        LeadCommands::List => {
            for (id, level) in overrides.all()? {
                println!("#{}: {}", id, level);
            }
        }
    }
    Ok(())
}

async fn dashboard(inbox: &Inbox, days: u32) -> Result<()> {
    let api = inbox.api();
    let (summary, usage, sales, leads) = tokio::try_join!(
        async { api.analytics_summary().await.context("Failed to load summary") },
        async { api.usage_stats().await.context("Failed to load usage") },
        inbox.sales_overview(days),
        inbox.lead_distribution(),
    )?;

    println!("{}", render::summary_block(&summary, &usage));
    println!();
    println!("{}", render::sales_block(&sales));
    println!();
    println!("{}", render::distribution_block(&leads));
    Ok(())
}

async fn integrations(inbox: &Inbox, limit: u32) -> Result<()> {
    let health = inbox.integration_health(limit).await?;
    if health.entries.is_empty() {
        println!("Nenhuma integração configurada.");
    } else {
        println!("{}", render::integrations_block(&health));
    }
    Ok(())
}

async fn profile(inbox: &Inbox) -> Result<()> {
    let profile = inbox.api().profile().await.context("Failed to load profile")?;
    println!("{}", render::profile_block(&profile));
    Ok(())
}
