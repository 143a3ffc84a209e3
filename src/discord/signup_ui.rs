// src/discord/signup_ui.rs
//
// Rendering of the signup board: one embed field per open hour plus one
// toggle button per slot. The buttons are stateless (the slot label rides in
// the custom_id) so they keep working after a restart.

use crate::signup::MembershipSnapshot;
use serenity::builder::{CreateActionRow, CreateButton, CreateEmbed};
use serenity::model::application::ButtonStyle;

pub const TOGGLE_PREFIX: &str = "signup:";

const BOARD_COLOR: u32 = 0x3498db;
// Discord caps components at 5 buttons per row, 5 rows per message.
const BUTTONS_PER_ROW: usize = 5;
const MAX_BUTTONS: usize = 25;

pub fn board_embed(snapshot: &MembershipSnapshot) -> CreateEmbed {
    let mut embed = CreateEmbed::new().title("Signup board").color(BOARD_COLOR);

    if snapshot.is_empty() {
        return embed.description("No hours are open right now.");
    }

    for entry in &snapshot.entries {
        let value = if entry.members.is_empty() {
            "nobody yet".to_string()
        } else {
            entry
                .members
                .iter()
                .map(|user| format!("<@{user}>"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        embed = embed.field(format!("{}:00", entry.label), value, false);
    }
    embed
}

pub fn board_buttons<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<CreateActionRow> {
    let mut rows = Vec::new();
    let mut row = Vec::new();

    for label in labels.take(MAX_BUTTONS) {
        row.push(
            CreateButton::new(format!("{TOGGLE_PREFIX}{label}"))
                .label(format!("{label}h"))
                .style(ButtonStyle::Primary),
        );
        if row.len() == BUTTONS_PER_ROW {
            rows.push(CreateActionRow::Buttons(std::mem::take(&mut row)));
        }
    }
    if !row.is_empty() {
        rows.push(CreateActionRow::Buttons(row));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signup::SlotMembers;
    use serenity::model::id::UserId;

    #[test]
    fn empty_board_gets_a_placeholder() {
        let snapshot = MembershipSnapshot { entries: vec![] };
        // just checking it builds without fields
        let _ = board_embed(&snapshot);
        assert!(board_buttons(std::iter::empty()).is_empty());
    }

    #[test]
    fn buttons_are_chunked_into_rows_of_five() {
        let labels = ["1", "2", "3", "4", "5", "6", "7"];
        let rows = board_buttons(labels.into_iter());
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn board_lists_every_visible_slot() {
        let snapshot = MembershipSnapshot {
            entries: vec![
                SlotMembers {
                    label: "9".into(),
                    members: vec![UserId::new(1)],
                },
                SlotMembers {
                    label: "22".into(),
                    members: vec![],
                },
            ],
        };
        let _ = board_embed(&snapshot);
    }
}
