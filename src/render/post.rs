use crate::model::event::{CANCEL_KEY, DONE_KEY, MessageContent, UserId};
use crate::model::flow::ItemStore;
use crate::model::item::StandupItem;

const RULE: &str = "----------------------------------------";

/// Framing applied around the rendered sections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Prepend the "preview" banner
    pub preview: bool,
    /// Append the "send or cancel?" footer
    pub send_confirmation: bool,
    /// Footer wording for an edit of an already sent post
    pub is_edit: bool,
    /// Offer ❌ in the footer
    pub cancellable: bool,
}

impl RenderOptions {
    /// The post as it appears in the send room
    pub fn final_post() -> Self {
        RenderOptions::default()
    }

    /// A preview without a footer (`show`)
    pub fn preview() -> Self {
        RenderOptions {
            preview: true,
            ..Default::default()
        }
    }

    /// The live preview that asks to send or cancel
    pub fn confirmation(is_edit: bool) -> Self {
        RenderOptions {
            preview: true,
            send_confirmation: true,
            is_edit,
            cancellable: true,
        }
    }

    /// The live preview while thread replies are still being collected.
    /// Only sending is offered; cancelling needs the `cancel` command.
    pub fn collecting() -> Self {
        RenderOptions {
            preview: true,
            send_confirmation: true,
            ..Default::default()
        }
    }
}

/// Render a user's items into a plain and rich post.
///
/// Only non-empty sections are rendered, in canonical order. The output
/// depends only on the arguments.
pub fn render_post(user: &UserId, store: &ItemStore, opts: RenderOptions) -> MessageContent {
    let mut plain = format!("{}'s standup post:\n\n", user);
    let mut rich = format!(
        "<a href=\"https://matrix.to/#/{}\">{}</a>'s standup post:<br><br>",
        user, user
    );

    let mut plain_sections = Vec::new();
    for (section, items) in store.non_empty() {
        plain_sections.push(format!("**{}**\n{}", section.label(), plain_list(items)));
        rich.push_str(&format!(
            "<b>{}</b><br><ul>{}</ul>",
            section.label(),
            rich_list(items)
        ));
    }
    plain.push_str(&plain_sections.join("\n\n"));

    if opts.preview {
        plain = format!("Standup post preview:\n{}\n{}", RULE, plain);
        rich = format!("<i>Standup post preview:</i><hr>{}", rich);
    }
    if opts.send_confirmation {
        let send = if opts.is_edit { "Send Edit" } else { "Send" };
        let question = if opts.cancellable {
            format!("{} ({}) or Cancel ({})?", send, DONE_KEY, CANCEL_KEY)
        } else {
            format!("{} ({})?", send, DONE_KEY)
        };
        plain = format!("{}\n{}\n{}", plain, RULE, question);
        rich = format!("{}<hr><b>{}</b>", rich, question);
    }

    MessageContent::text(plain).with_rich(rich)
}

fn plain_list(items: &[StandupItem]) -> String {
    items
        .iter()
        .map(|i| format!("- {}", i.plain_text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn rich_list(items: &[StandupItem]) -> String {
    items
        .iter()
        .map(|i| match &i.rich_text {
            Some(rich) => format!("<li>{}</li>", rich),
            None => format!("<li>{}</li>", html_escape(&i.plain_text)),
        })
        .collect()
}

/// Escape plain text for use inside the rich rendering
fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::section::Section;
    use crate::ops::item_ops::append_to;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    fn alice() -> UserId {
        UserId::from("@alice:example.org")
    }

    fn sample_store() -> ItemStore {
        let mut store = ItemStore::default();
        // Inserted out of display order on purpose
        append_to(
            &mut store,
            Section::Blockers,
            StandupItem::new("$3".into(), "Waiting on review".into(), None),
        );
        append_to(
            &mut store,
            Section::Yesterday,
            StandupItem::new("$1".into(), "Fixed bug".into(), None),
        );
        append_to(
            &mut store,
            Section::Yesterday,
            StandupItem::new(
                "$2".into(),
                "Wrote tests".into(),
                Some("Wrote <b>tests</b>".into()),
            ),
        );
        store
    }

    #[test]
    fn test_final_post_plain() {
        let post = render_post(&alice(), &sample_store(), RenderOptions::final_post());
        assert_snapshot!(post.plain, @r"
@alice:example.org's standup post:

**Yesterday**
- Fixed bug
- Wrote tests

**Blockers**
- Waiting on review
");
    }

    #[test]
    fn test_final_post_rich() {
        let post = render_post(&alice(), &sample_store(), RenderOptions::final_post());
        assert_eq!(
            post.rich.as_deref(),
            Some(
                "<a href=\"https://matrix.to/#/@alice:example.org\">@alice:example.org</a>'s standup post:<br><br>\
                 <b>Yesterday</b><br><ul><li>Fixed bug</li><li>Wrote <b>tests</b></li></ul>\
                 <b>Blockers</b><br><ul><li>Waiting on review</li></ul>"
            )
        );
    }

    #[test]
    fn test_confirmation_framing() {
        let post = render_post(&alice(), &sample_store(), RenderOptions::confirmation(false));
        assert!(post.plain.starts_with("Standup post preview:\n----------------------------------------\n@alice"));
        assert!(post.plain.ends_with("\n----------------------------------------\nSend (✅) or Cancel (❌)?"));
        let rich = post.rich.unwrap();
        assert!(rich.starts_with("<i>Standup post preview:</i><hr>"));
        assert!(rich.ends_with("<hr><b>Send (✅) or Cancel (❌)?</b>"));
    }

    #[test]
    fn test_edit_confirmation_wording() {
        let post = render_post(&alice(), &sample_store(), RenderOptions::confirmation(true));
        assert!(post.plain.ends_with("Send Edit (✅) or Cancel (❌)?"));
        assert!(post.rich_or_plain().ends_with("<b>Send Edit (✅) or Cancel (❌)?</b>"));
    }

    #[test]
    fn test_collecting_preview_offers_send_only() {
        let post = render_post(&alice(), &sample_store(), RenderOptions::collecting());
        assert!(post.plain.ends_with("\n----------------------------------------\nSend (✅)?"));
        assert!(!post.plain.contains(CANCEL_KEY));
        assert!(post.rich.unwrap().ends_with("<hr><b>Send (✅)?</b>"));
    }

    #[test]
    fn test_plain_fallback_is_escaped_in_rich() {
        let mut store = ItemStore::default();
        append_to(
            &mut store,
            Section::Notes,
            StandupItem::new("$1".into(), "a < b & \"c\"".into(), None),
        );
        let post = render_post(&alice(), &store, RenderOptions::final_post());
        assert!(post.plain.ends_with("- a < b & \"c\""));
        assert!(
            post.rich
                .unwrap()
                .ends_with("<ul><li>a &lt; b &amp; &quot;c&quot;</li></ul>")
        );
    }

    #[test]
    fn test_preview_without_footer() {
        let post = render_post(&alice(), &sample_store(), RenderOptions::preview());
        assert!(post.plain.starts_with("Standup post preview:"));
        assert!(!post.plain.contains("Cancel"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let store = sample_store();
        for opts in [
            RenderOptions::final_post(),
            RenderOptions::preview(),
            RenderOptions::confirmation(true),
            RenderOptions::collecting(),
        ] {
            assert_eq!(
                render_post(&alice(), &store, opts),
                render_post(&alice(), &store.clone(), opts)
            );
        }
    }

    #[test]
    fn test_empty_store_renders_header_only() {
        let post = render_post(&alice(), &ItemStore::default(), RenderOptions::final_post());
        assert_eq!(post.plain, "@alice:example.org's standup post:\n\n");
    }
}
