//! `orbit inbox`: messages left for the session by other agents.

use clap::{Args, Subcommand};
use orbit_core::model::Message;
use std::io::{self, Write};

use super::Context;
use crate::output::{Renderable, format_time, render_item, render_list, render_success};

#[derive(Subcommand, Debug)]
pub enum InboxCommand {
    /// Drop a message into the inbox.
    Add(AddArgs),
    /// Mark a message read by ID or unique prefix.
    Read(ReadArgs),
    /// List unread messages.
    List,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub content: String,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Message ID or a unique prefix of one.
    pub id: String,
}

impl Renderable for Message {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let marker = if self.read { " " } else { "*" };
        let short: String = self.id.chars().take(8).collect();
        writeln!(
            w,
            "{marker} {short}  {}  {}",
            format_time(self.created_at),
            self.content
        )
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{}  {}  {}", self.id, self.read, self.content)
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "read", "content"]
    }
}

pub fn run_inbox(command: &InboxCommand, ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.store()?;
    match command {
        InboxCommand::Add(args) => render_item(&store.inbox_add(&args.content)?, ctx.output),
        InboxCommand::Read(args) => {
            let id = store.inbox_mark_read(&args.id)?;
            render_success(ctx.output, &format!("Marked {id} read"))
        }
        InboxCommand::List => render_list(&store.inbox_list()?, ctx.output, "inbox empty"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn pretty_row_shortens_id_and_flags_unread() {
        let msg = Message {
            id: "0123456789abcdef".into(),
            content: "check CI".into(),
            read: false,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap(),
        };
        let mut buf = Vec::new();
        msg.render_human(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "* 01234567  2026-03-01 08:30:00  check CI\n"
        );
    }
}
