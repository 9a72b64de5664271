//! /session command - show conversation info

use super::CommandResult;
use hubchat_ai::{Assistant, Role};
use hubchat_relay::ChatRelay;

pub struct SessionCommand;

impl SessionCommand {
    pub fn execute(relay: &ChatRelay, assistant: &Assistant) -> CommandResult {
        let transcript = relay.transcript();

        let mut output = String::from("Session Info\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');

        output.push_str(&format!(
            "Assistant:  {} ({})\n",
            assistant.display_name(),
            assistant.id
        ));
        if let Some(model) = &assistant.model {
            output.push_str(&format!("Model:      {}\n", model));
        }
        output.push('\n');

        match relay.thread_id() {
            Some(thread) => output.push_str(&format!("Thread:     {}\n", thread)),
            None => output.push_str("Thread:     (starts with your first question)\n"),
        }
        output.push_str(&format!("Turns:      {} total\n", transcript.len()));
        output.push_str(&format!(
            "            {} user, {} assistant\n",
            transcript.count(Role::User),
            transcript.count(Role::Assistant)
        ));

        let started = transcript.first().and_then(|t| t.local_time());
        let latest = transcript.last().and_then(|t| t.local_time());
        if let (Some(started), Some(latest)) = (started, latest) {
            output.push_str(&format!("Started:    {}\n", started.format("%H:%M:%S")));
            output.push_str(&format!("Last turn:  {}\n", latest.format("%H:%M:%S")));
        }

        CommandResult::Message(output)
    }
}
