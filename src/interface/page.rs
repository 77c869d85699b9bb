use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset};

use crate::chat::{ChatDocument, Message};

const REFRESH_SCRIPT: &str = r#"
      let isInput = false;
      document.addEventListener("input", () => {
        isInput = true;
      });
      window.setInterval(() => {
        if (!isInput) {
          window.location.reload();
        }
      }, 20000);
"#;

/// Render the board. `sender` decides between the post/leave forms and the
/// join form.
pub fn render(chat: &ChatDocument, sender: Option<&str>, offset: &FixedOffset) -> String {
    let mut body = String::new();

    body.push_str("<div>\n<div>\n参加者:\n");
    for s in chat.senders_newest_first() {
        let _ = writeln!(body, "<span>{} </span>", escape(&s.name));
    }
    body.push_str("</div>\n");

    body.push_str("<ul style=\"max-height: 600px;overflow:auto\">\n");
    for m in chat.messages_newest_first() {
        render_message(&mut body, m, offset);
    }
    body.push_str("</ul>\n");

    if sender.is_some() {
        body.push_str(concat!(
            "<form action=\"/\" method=\"post\">\n",
            "<input type=\"text\" name=\"message\" autofocus />\n",
            "<input type=\"submit\" value=\"送信 / 更新\" />\n",
            "</form>\n",
            "<form action=\"/leave\" method=\"get\">\n",
            "<input type=\"submit\" value=\"退出\" />\n",
            "</form>\n",
        ));
    } else {
        body.push_str(concat!(
            "<form action=\"/join\" method=\"post\">\n",
            "<input type=\"text\" name=\"name\" />\n",
            "<input type=\"submit\" value=\"参加\" />\n",
            "</form>\n",
        ));
    }

    let _ = writeln!(body, "<script>{}</script>\n</div>", REFRESH_SCRIPT);

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>chat</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        body
    )
}

fn render_message(out: &mut String, m: &Message, offset: &FixedOffset) {
    let _ = write!(
        out,
        concat!(
            "<li>\n",
            "<span>{} &gt;&gt;  </span>\n",
            "<span>{}</span>\n",
            "<span style=\"margin-left: 10px\">{}</span>\n",
            "</li>\n",
            "<hr />\n",
        ),
        escape(&m.sender.name),
        escape(&m.message),
        format_timestamp(m.timestamp, offset),
    );
}

/// Same layout as `toLocaleString("ja-JP")`, e.g. `2024/1/5 9:03:07`.
pub fn format_timestamp(millis: i64, offset: &FixedOffset) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(utc) => utc
            .with_timezone(offset)
            .format("%Y/%-m/%-d %-H:%M:%S")
            .to_string(),
        None => "Invalid Date".to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn formats_like_japanese_locale() {
        // 2024-01-05T09:03:07Z
        assert_eq!(format_timestamp(1_704_445_387_000, &utc()), "2024/1/5 9:03:07");

        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(format_timestamp(1_704_445_387_000, &jst), "2024/1/5 18:03:07");
    }

    #[test]
    fn join_form_without_sender() {
        let html = render(&ChatDocument::default(), None, &utc());
        assert!(html.contains("action=\"/join\""));
        assert!(!html.contains("action=\"/leave\""));
        assert!(html.contains("20000"));
    }

    #[test]
    fn post_and_leave_forms_with_sender() {
        let html = render(&ChatDocument::default(), Some("Alice"), &utc());
        assert!(html.contains("name=\"message\""));
        assert!(html.contains("action=\"/leave\""));
        assert!(!html.contains("action=\"/join\""));
    }

    #[test]
    fn lists_are_newest_first() {
        let mut chat = ChatDocument::default();
        chat.join("A", 1);
        chat.join("B", 2);
        chat.post("B", "second", 3);

        let html = render(&chat, None, &utc());
        assert!(html.find("<span>B </span>").unwrap() < html.find("<span>A </span>").unwrap());
        assert!(html.find("second").unwrap() < html.find("Bさんが参加しました").unwrap());
        assert!(html.find("Bさんが参加しました").unwrap() < html.find("Aさんが参加しました").unwrap());
    }

    #[test]
    fn user_text_is_escaped() {
        let mut chat = ChatDocument::default();
        chat.post("<b>", "<script>alert('x')</script>", 0);

        let html = render(&chat, None, &utc());
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("&lt;b&gt; &gt;&gt;  "));
    }
}
