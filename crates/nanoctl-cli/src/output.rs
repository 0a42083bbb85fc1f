//! Formatted output helpers for CLI commands.
//!
//! Provides the cluster table, readiness timeout headers, and pull
//! progress rendering.

use std::fmt::Write as _;
use std::io::Write as _;

use nanoctl_common::types::{ClusterName, ContainerName};
use nanoctl_runtime::controller::{ClusterRow, PullEvent};
use nanoctl_runtime::readiness::Phase;
use nanoctl_runtime::registry::TagSummary;

const HEADERS: [&str; 5] = ["NAME", "STATUS", "IMAGE", "IMAGE RELEASE", "IMAGE CREATION TIME"];

/// Renders clusters as a left-aligned table, one line per cluster.
#[must_use]
pub fn cluster_table(rows: &[ClusterRow]) -> String {
    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|r| {
            [
                r.name.clone(),
                r.state.to_string(),
                r.image.tag.clone(),
                r.image.release.clone(),
                r.image.created.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let header = HEADERS.map(String::from);
    for row in std::iter::once(&header).chain(&cells) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

/// Returns the line printed before the diagnostic log of a timed-out
/// readiness phase.
#[must_use]
pub fn timeout_header(phase: Phase, cluster: &ClusterName, container: &ContainerName) -> String {
    match phase {
        Phase::Internal => format!(
            "The container {container} never reached a clean state. Showing the container logs now:"
        ),
        Phase::External => {
            format!("S3 gateway for cluster {cluster} is not responding. Showing S3 logs:")
        }
    }
}

/// Prints image pull progress as one dot per engine message.
pub fn pull_progress(event: PullEvent<'_>) {
    match event {
        PullEvent::Started(image) => print!("The container image {image} is not present, pulling it"),
        PullEvent::Progress(_) => print!("."),
        PullEvent::Finished => println!(),
    }
    let _ = std::io::stdout().flush();
}

/// Describes a registry tag count.
#[must_use]
pub fn tag_summary(summary: TagSummary) -> String {
    format!(
        "{} tags available ({} pages of results)",
        summary.count, summary.pages
    )
}

#[cfg(test)]
mod tests {
    use nanoctl_common::types::ContainerState;
    use nanoctl_runtime::identity::ImageMetadata;

    use super::*;

    fn row(name: &str, state: &str, tag: &str) -> ClusterRow {
        ClusterRow {
            name: name.into(),
            state: ContainerState::from(state),
            image: ImageMetadata {
                tag: tag.into(),
                created: "2024-01-02T03:04:05Z".into(),
                release: "v3.2".into(),
            },
        }
    }

    #[test]
    fn cluster_table_has_header_and_one_line_per_row() {
        let table = cluster_table(&[
            row("a", "running", "ceph/daemon:latest"),
            row("bb", "exited", "d1"),
        ]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("NAME  STATUS"));
        assert!(lines[1].starts_with("a     running  ceph/daemon:latest"));
        assert!(lines[2].starts_with("bb    exited   d1"));
    }

    #[test]
    fn cluster_table_columns_align() {
        let table = cluster_table(&[row("a", "running", "ceph/daemon:latest")]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0].find("IMAGE RELEASE"), lines[1].find("v3.2"));
    }

    #[test]
    fn timeout_header_names_container_for_internal_phase() {
        let cluster = ClusterName::new("a").expect("name");
        let container = ContainerName::new("ceph-nano-", &cluster);
        let header = timeout_header(Phase::Internal, &cluster, &container);
        assert!(header.contains("ceph-nano-a never reached a clean state"));
    }

    #[test]
    fn timeout_header_names_cluster_for_external_phase() {
        let cluster = ClusterName::new("a").expect("name");
        let container = ContainerName::new("ceph-nano-", &cluster);
        assert_eq!(
            timeout_header(Phase::External, &cluster, &container),
            "S3 gateway for cluster a is not responding. Showing S3 logs:"
        );
    }

    #[test]
    fn tag_summary_reports_count_and_pages() {
        assert_eq!(
            tag_summary(TagSummary::from_count(42)),
            "42 tags available (4 pages of results)"
        );
    }
}
