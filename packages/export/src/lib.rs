#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Markdown export of review comment threads.
//!
//! Threads are grouped by file (files in path order, threads by starting
//! line). Comment bodies go inside fenced blocks with any triple backticks
//! escaped, so a body can never close its own fence.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::path::Path;

use reviewpad_comment_models::Thread;
use reviewpad_registry::{ReviewConfig, ThreadRegistry};

const FENCE: &str = "```";
const ESCAPED_FENCE: &str = "\\`\\`\\`";

/// A markdown report over a snapshot of threads.
///
/// Rendering goes through [`fmt::Display`]; use [`ToString::to_string`] or
/// [`export_markdown`] to get the text.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownExport<'a> {
    threads: &'a [Thread],
    title: &'a str,
    workspace_root: Option<&'a Path>,
}

impl<'a> MarkdownExport<'a> {
    #[must_use]
    pub fn new(threads: &'a [Thread], config: &'a ReviewConfig) -> Self {
        Self {
            threads,
            title: &config.export_title,
            workspace_root: config.workspace_root.as_deref(),
        }
    }

    fn file_path(&self, thread: &Thread) -> String {
        let location = thread.location();
        location
            .relative_path(self.workspace_root)
            .unwrap_or_else(|| location.uri.clone())
    }

    fn by_file(&self) -> BTreeMap<String, Vec<&'a Thread>> {
        let mut files: BTreeMap<String, Vec<&'a Thread>> = BTreeMap::new();
        for thread in self.threads {
            files.entry(self.file_path(thread)).or_default().push(thread);
        }
        for threads in files.values_mut() {
            threads.sort_by_key(|thread| (thread.location().range.start, thread.id()));
        }
        files
    }
}

/// Escape every run of three backticks.
#[must_use]
pub fn escape_fences(body: &str) -> String {
    body.replace(FENCE, ESCAPED_FENCE)
}

fn link_target(path: &str) -> String {
    path.replace(' ', "%20")
}

fn write_thread(f: &mut fmt::Formatter<'_>, path: &str, thread: &Thread) -> fmt::Result {
    let location = thread.location();
    let line = location.line();

    writeln!(f)?;
    write!(
        f,
        "### [{path}:{line}:{}]({}#L{line}",
        location.column(),
        link_target(path)
    )?;
    if location.is_multi_line() {
        write!(f, "-L{}", location.end_line())?;
    }
    f.write_char(')')?;
    if let Some(label) = thread.label() {
        write!(f, " {label}")?;
    }
    writeln!(f)?;
    writeln!(f)?;
    writeln!(f, "Status: {}", thread.state().as_ref())?;

    if thread.comments().is_empty() {
        writeln!(f)?;
        return writeln!(f, "_No comments_");
    }

    for comment in thread.comments() {
        writeln!(f)?;
        write!(f, "**{}**", comment.author().name)?;
        if let Some(label) = comment.label() {
            write!(f, " _({label})_")?;
        }
        writeln!(f, ":")?;
        writeln!(f)?;
        writeln!(f, "{FENCE}")?;
        let body = comment.body().as_str().trim_end_matches(['\r', '\n']);
        writeln!(f, "{}", escape_fences(body))?;
        writeln!(f, "{FENCE}")?;
    }

    Ok(())
}

impl fmt::Display for MarkdownExport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.title)?;

        if self.threads.is_empty() {
            writeln!(f)?;
            return writeln!(f, "_No review comments._");
        }

        for (path, threads) in self.by_file() {
            writeln!(f)?;
            writeln!(f, "## File: {path}")?;
            for thread in threads {
                write_thread(f, &path, thread)?;
            }
        }

        Ok(())
    }
}

/// Render `threads` as a newline-terminated markdown report.
#[must_use]
pub fn export_markdown(threads: &[Thread], config: &ReviewConfig) -> String {
    MarkdownExport::new(threads, config).to_string()
}

/// Render every thread in `registry`.
#[must_use]
pub fn export_registry(registry: &ThreadRegistry) -> String {
    export_markdown(&registry.all_threads(), registry.config())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone as _, Utc};
    use reviewpad_comment_models::{
        Comment, CommentAuthor, CommentId, LineRange, ThreadId, ThreadLocation, ThreadState,
    };

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn thread(seq: u64, uri: &str, range: LineRange, bodies: &[(&str, &str)]) -> Thread {
        let id = ThreadId::new(seq, 0);
        let mut thread = Thread::new(id, ThreadLocation::new(uri, range), at(0));
        for (n, (author, body)) in (1..).zip(bodies) {
            thread.push_comment(
                Comment::new(
                    CommentId(seq * 100 + n),
                    id,
                    (*body).into(),
                    CommentAuthor::named(*author),
                    None,
                    at(0),
                ),
                at(0),
            );
        }
        thread
    }

    #[test]
    fn test_same_file_threads_grouped_and_ordered() {
        let threads = vec![
            thread(1, "src/app.ts", LineRange::single(9), &[("Bob", "Second")]),
            thread(2, "src/app.ts", LineRange::single(2), &[("Alice", "First")]),
        ];

        let markdown = export_markdown(&threads, &ReviewConfig::default());

        assert_eq!(
            markdown,
            "# Code Review Comments\n\
             \n\
             ## File: src/app.ts\n\
             \n\
             ### [src/app.ts:3:1](src/app.ts#L3)\n\
             \n\
             Status: open\n\
             \n\
             **Alice**:\n\
             \n\
             ```\n\
             First\n\
             ```\n\
             \n\
             ### [src/app.ts:10:1](src/app.ts#L10)\n\
             \n\
             Status: open\n\
             \n\
             **Bob**:\n\
             \n\
             ```\n\
             Second\n\
             ```\n"
        );
        assert_eq!(markdown.matches("## File:").count(), 1);
    }

    #[test]
    fn test_files_sorted_by_path() {
        let threads = vec![
            thread(1, "z.rs", LineRange::single(0), &[("A", "z")]),
            thread(2, "a.rs", LineRange::single(0), &[("A", "a")]),
            thread(3, "m.rs", LineRange::single(0), &[("A", "m")]),
        ];

        let markdown = export_markdown(&threads, &ReviewConfig::default());

        let a = markdown.find("## File: a.rs").unwrap();
        let m = markdown.find("## File: m.rs").unwrap();
        let z = markdown.find("## File: z.rs").unwrap();
        assert!(a < m && m < z);
    }

    #[test]
    fn test_backticks_are_escaped() {
        let threads = vec![thread(
            1,
            "a.rs",
            LineRange::single(0),
            &[("A", "Try:\n```rust\nfn main() {}\n```")],
        )];

        let markdown = export_markdown(&threads, &ReviewConfig::default());

        assert!(markdown.ends_with(
            "**A**:\n\n```\nTry:\n\\`\\`\\`rust\nfn main() {}\n\\`\\`\\`\n```\n"
        ));
        let unescaped = markdown.replace(ESCAPED_FENCE, "");
        assert_eq!(unescaped.matches(FENCE).count(), 2);
    }

    #[test]
    fn test_escape_fences_long_runs() {
        assert_eq!(escape_fences("````"), "\\`\\`\\``");
        assert_eq!(escape_fences("a `b` c"), "a `b` c");
    }

    #[test]
    fn test_thread_without_comments() {
        let threads = vec![thread(1, "a.rs", LineRange::single(0), &[])];
        let markdown = export_markdown(&threads, &ReviewConfig::default());
        assert!(markdown.ends_with("Status: open\n\n_No comments_\n"));
    }

    #[test]
    fn test_empty_export() {
        let markdown = export_markdown(&[], &ReviewConfig::default());
        assert_eq!(markdown, "# Code Review Comments\n\n_No review comments._\n");
    }

    #[test]
    fn test_label_range_and_status() {
        let mut t = thread(
            1,
            "file:///work/project/src/my file.rs",
            LineRange { start: 4, end: 7 },
            &[("A", "body")],
        );
        t.set_label(Some("Security".to_string()));
        t.set_state(ThreadState::Resolved, at(1));

        let config = ReviewConfig::default().with_workspace_root("/work/project");
        let markdown = export_markdown(&[t], &config);

        assert!(markdown.contains("## File: src/my file.rs\n"));
        assert!(markdown.contains(
            "### [src/my file.rs:5:1](src/my%20file.rs#L5-L8) Security\n\nStatus: resolved\n"
        ));
    }

    #[test]
    fn test_same_line_threads_ordered_by_id() {
        let threads = vec![
            thread(7, "a.rs", LineRange::single(3), &[("A", "later")]),
            thread(2, "a.rs", LineRange::single(3), &[("A", "earlier")]),
        ];
        let mut reversed = threads.clone();
        reversed.reverse();

        let config = ReviewConfig::default();
        let markdown = export_markdown(&threads, &config);

        assert!(markdown.find("earlier").unwrap() < markdown.find("later").unwrap());
        assert_eq!(markdown, export_markdown(&reversed, &config));
    }

    #[test]
    fn test_output_is_deterministic() {
        let threads = vec![
            thread(1, "b.rs", LineRange::single(4), &[("A", "one")]),
            thread(2, "a.rs", LineRange::single(4), &[("A", "two")]),
            thread(3, "b.rs", LineRange::single(1), &[("A", "three")]),
        ];
        let mut reversed = threads.clone();
        reversed.reverse();

        let config = ReviewConfig::default();
        assert_eq!(
            export_markdown(&threads, &config),
            export_markdown(&reversed, &config)
        );
    }
}
