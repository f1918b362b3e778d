//! JSON-lines session scripts: one user interaction per line, replayed
//! against a [`ParkMap`] backed by the in-memory provider.

use crate::hit_test::HitOutcome;
use crate::map::ParkMap;
use crate::models::{ObjectId, PointerEvent};
use crate::park::FocusOutcome;
use crate::provider::memory::MemoryMap;
use crate::table::TableRows;
use anyhow::Context;
use geo::{LineString, Polygon};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Command {
    Focus { park: String },
    Reset,
    OpenSheet,
    CloseSheet,
    /// Arms the freehand lasso
    Select,
    /// Completes the lasso with this ring of `[x, y]` points
    Draw { polygon: Vec<[f64; 2]> },
    Click { x: f64, y: f64 },
    Hover { x: f64, y: f64 },
    RowHover { id: ObjectId },
    RowOut,
    Trail { id: ObjectId },
    GoTo { id: ObjectId },
    Clear,
    Share,
    Bind { layer: String },
    FilterExtent,
    RemoveFilter,
    SelectedOnly,
    ShowAll,
    Rows,
    Describe,
}

pub fn parse_script(source: &str) -> anyhow::Result<Vec<Command>> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(n, line)| {
            serde_json::from_str(line).with_context(|| format!("invalid command on line {}", n + 1))
        })
        .collect()
}

/// What a command produced, for the runner to print.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Message(String),
    Rows(TableRows),
}

pub async fn execute(app: &ParkMap, memory: &MemoryMap, command: Command) -> anyhow::Result<Output> {
    let table = app.table();
    let message = match command {
        Command::Focus { park } => match app.focus_park(&park).await {
            FocusOutcome::Focused(_) => format!("focused {}", park),
            FocusOutcome::Superseded => format!("focus on {} superseded", park),
            FocusOutcome::NotFound => format!("park {} not found", park),
        },
        Command::Reset => {
            app.reset_parks().await;
            "parks reset".to_string()
        }
        Command::OpenSheet => {
            app.open_sheet();
            "sheet opened".to_string()
        }
        Command::CloseSheet => {
            app.close_sheet();
            "sheet closed".to_string()
        }
        Command::Select => {
            app.start_selection();
            "drawing selection".to_string()
        }
        Command::Draw { polygon } => {
            let ring: LineString<f64> = polygon.into_iter().map(|[x, y]| (x, y)).collect();
            let event = memory.finish_sketch(Polygon::new(ring, Vec::new()));
            let added = app.complete_sketch(event).await;
            format!("lasso selected {} new", added)
        }
        Command::Click { x, y } => {
            let toggled = app.click(&PointerEvent::at(x, y)).await;
            format!("toggled {:?}", toggled)
        }
        Command::Hover { x, y } => match app.pointer_move(&PointerEvent::at(x, y)).await {
            HitOutcome::Hit(feature) => format!("hovering {}", feature.object_id),
            HitOutcome::Miss => "hovering nothing".to_string(),
            HitOutcome::Discarded => "hover discarded".to_string(),
        },
        Command::RowHover { id } => match app.find_feature(id).await {
            Some(feature) => {
                table.row_hover(&feature);
                format!("row {} highlighted", id)
            }
            None => format!("row {} not found", id),
        },
        Command::RowOut => {
            table.row_hover_out();
            "row highlights cleared".to_string()
        }
        Command::Trail { id } => match app.find_feature(id).await {
            Some(feature) => {
                app.select_row(&feature).await;
                format!("trail {} added", id)
            }
            None => format!("trail {} not found", id),
        },
        Command::GoTo { id } => match app.find_feature(id).await {
            Some(feature) => {
                app.go_to_feature(&feature).await;
                format!("zoomed to {}", id)
            }
            None => format!("feature {} not found", id),
        },
        Command::Clear => format!("cleared {}", app.clear_selection().await),
        Command::Share => match app.share()? {
            Some(url) => url,
            None => "nothing selected to share".to_string(),
        },
        Command::Bind { layer } => {
            app.bind_layer(&layer)?;
            table.refresh().await;
            format!("table bound to {}", layer)
        }
        Command::FilterExtent => {
            table.filter_by_extent();
            table.refresh().await;
            "filtered by extent".to_string()
        }
        Command::RemoveFilter => {
            table.set_filter_geometry(None);
            table.refresh().await;
            "extent filter removed".to_string()
        }
        Command::SelectedOnly => {
            table.set_filter_by_selection(true);
            table.refresh().await;
            "showing selected rows".to_string()
        }
        Command::ShowAll => {
            table.set_filter_by_selection(false);
            table.refresh().await;
            "showing all rows".to_string()
        }
        Command::Rows => return Ok(Output::Rows(table.rows().await)),
        Command::Describe => table.description(),
    };
    Ok(Output::Message(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::InitError;
    use crate::models::{FeatureRef, LayerInfo};
    use crate::provider::memory::MemoryLayer;
    use geo::{line_string, polygon};
    use std::sync::Arc;

    fn session() -> (ParkMap, Arc<MemoryMap>) {
        let parks = MemoryLayer::new(
            LayerInfo::new("parks", "Swiss National Parks"),
            vec![
                FeatureRef::new("parks", 1)
                    .with_attribute("Name", "Parc Ela")
                    .with_geometry(polygon![(x: 9.5, y: 46.5), (x: 9.8, y: 46.5), (x: 9.8, y: 46.7), (x: 9.5, y: 46.7)]),
            ],
        );
        let trails = MemoryLayer::new(
            LayerInfo::new("trails", "Hiking trails"),
            [(1, 9.6), (2, 9.7), (3, 9.0)]
                .into_iter()
                .map(|(id, x)| {
                    FeatureRef::new("trails", id)
                        .with_geometry(line_string![(x: x, y: 46.55), (x: x, y: 46.65)])
                        .with_attribute("TourNameR", format!("Route {}", id))
                })
                .collect(),
        );
        let memory = Arc::new(MemoryMap::new(vec![Arc::new(parks), Arc::new(trails)]));
        let app = ParkMap::from_memory(Config::default(), memory.clone()).unwrap();
        (app, memory)
    }

    fn message(output: Output) -> String {
        match output {
            Output::Message(message) => message,
            Output::Rows(rows) => panic!("expected a message, got {:?}", rows),
        }
    }

    #[tokio::test]
    async fn test_execute_replays_session() {
        let (app, memory) = session();
        let script = r#"
            {"type": "focus", "park": "Parc Ela"}
            {"type": "select"}
            {"type": "draw", "polygon": [[9.55, 46.5], [9.75, 46.5], [9.75, 46.7], [9.55, 46.7]]}
            {"type": "selected-only"}
            {"type": "describe"}
            {"type": "rows"}
            {"type": "hover", "x": 9.6, "y": 46.6}
            {"type": "share"}
            {"type": "clear"}
            {"type": "describe"}
        "#;
        let mut outputs = Vec::new();
        for command in parse_script(script).unwrap() {
            outputs.push(execute(&app, &memory, command).await.unwrap());
        }

        let rows = match outputs.remove(5) {
            Output::Rows(rows) => rows,
            other => panic!("expected rows, got {:?}", other),
        };
        assert_eq!(rows.rows.iter().map(|r| r.object_id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(rows.rows.iter().all(|r| r.selected));

        let messages: Vec<String> = outputs.into_iter().map(message).collect();
        assert_eq!(messages[0], "focused Parc Ela");
        assert_eq!(messages[1], "drawing selection");
        assert_eq!(messages[2], "lasso selected 2 new");
        assert_eq!(messages[3], "showing selected rows");
        assert_eq!(messages[4], "Features: 2; Selection: 2");
        assert_eq!(messages[5], "hovering 1");
        assert!(messages[6].starts_with("https://jsapi.maps.arcgis.com/apps/instant/countdown/index.html?appid="));
        assert!(messages[6].contains("%22objectIds%22:%5B1,2%5D"));
        assert_eq!(memory.snapshot().opened_urls, vec![messages[6].clone()]);
        assert_eq!(messages[7], "cleared 2");
        assert_eq!(messages[8], "Features: 0; Selection: 0");
    }

    #[tokio::test]
    async fn test_execute_trail_and_go_to() {
        let (app, memory) = session();

        let out = execute(&app, &memory, Command::Trail { id: 3 }).await.unwrap();
        assert_eq!(message(out), "trail 3 added");
        assert!(app.session().is_selected(3));

        let out = execute(&app, &memory, Command::GoTo { id: 3 }).await.unwrap();
        assert_eq!(message(out), "zoomed to 3");
        assert_eq!(memory.snapshot().goto_count, 1);

        let out = execute(&app, &memory, Command::Trail { id: 99 }).await.unwrap();
        assert_eq!(message(out), "trail 99 not found");

        let out = execute(&app, &memory, Command::Focus { park: "Atlantis".to_string() })
            .await
            .unwrap();
        assert_eq!(message(out), "park Atlantis not found");
    }

    #[tokio::test]
    async fn test_execute_share_and_bind_edges() {
        let (app, memory) = session();

        let out = execute(&app, &memory, Command::Share).await.unwrap();
        assert_eq!(message(out), "nothing selected to share");

        let err = execute(&app, &memory, Command::Bind { layer: "Lakes".to_string() })
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InitError>(),
            Some(InitError::MissingLayer(title)) if title == "Lakes"
        ));

        let out = execute(
            &app,
            &memory,
            Command::Bind {
                layer: "Swiss National Parks".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(message(out), "table bound to Swiss National Parks");
        assert_eq!(message(execute(&app, &memory, Command::Describe).await.unwrap()), "Features: 1; Selection: 0");
    }

    #[test]
    fn test_parse_script_skips_comments_and_blanks() {
        let script = r#"
            # pick a park
            {"type": "focus", "park": "Parc Ela"}

            {"type": "draw", "polygon": [[0, 0], [1, 0], [1, 1]]}
            {"type": "row-hover", "id": 4}
            {"type": "selected-only"}
        "#;
        let commands = parse_script(script).unwrap();
        assert_eq!(
            commands,
            vec![
                Command::Focus {
                    park: "Parc Ela".to_string()
                },
                Command::Draw {
                    polygon: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]
                },
                Command::RowHover { id: 4 },
                Command::SelectedOnly,
            ]
        );
    }

    #[test]
    fn test_parse_script_reports_line() {
        let err = parse_script("{\"type\": \"reset\"}\n{\"type\": \"fly\"}").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
