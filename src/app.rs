use ganttview::io;
use ganttview::model::task::{DependencyList, RawTask};
use ganttview::ui::{self, theme, ToolbarAction};
use ganttview::{Gantt, GanttConfig, GanttEvent};

/// Demo application state.
pub struct GanttApp {
    pub gantt: Gantt,
    pub status_message: String,
}

impl GanttApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Register Phosphor icons as a fallback so they render inline
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        theme::apply_theme(&cc.egui_ctx);

        let gantt = Gantt::new(Self::sample_records(), GanttConfig::default())
            .expect("default configuration is valid");

        Self {
            gantt,
            status_message: "Ready".to_string(),
        }
    }

    /// Generate sample records for demonstration.
    fn sample_records() -> Vec<RawTask> {
        let today = chrono::Local::now().date_naive();
        let day = |offset: i64| (today + chrono::Duration::days(offset)).format("%Y-%m-%d").to_string();
        let record = |id: &str, name: &str, start: i64, end: i64| RawTask {
            id: Some(id.into()),
            name: name.into(),
            start: Some(day(start)),
            end: Some(day(end)),
            ..Default::default()
        };

        let mut kickoff = record("kickoff", "Project Kickoff", -5, -3);
        kickoff.progress = Some(100.0);
        kickoff.swimlane = Some("Planning".into());
        kickoff.sub_swimlane = Some("Management".into());

        let mut requirements = record("requirements", "Requirements Gathering", -3, 2);
        requirements.progress = Some(60.0);
        requirements.dependencies = Some(DependencyList::Text("kickoff".into()));
        requirements.swimlane = Some("Planning".into());
        requirements.sub_swimlane = Some("Management".into());

        let mut design = record("design", "System Design", 0, 6);
        design.progress = Some(25.0);
        design.dependencies = Some(DependencyList::Text("kickoff".into()));
        design.swimlane = Some("Planning".into());
        design.sub_swimlane = Some("Architecture".into());
        design.primary_color = Some("#7e57c2".into());

        let mut backend = record("backend", "Backend Implementation", 4, 14);
        backend.dependencies = Some(DependencyList::Text("design".into()));
        backend.swimlane = Some("Engineering".into());
        backend.sub_swimlane = Some("Services".into());

        let mut frontend = record("frontend", "Frontend Implementation", 6, 16);
        frontend.dependencies = Some(DependencyList::Text("design".into()));
        frontend.swimlane = Some("Engineering".into());
        frontend.sub_swimlane = Some("Client".into());
        frontend.primary_color = Some("#26a69a".into());

        let mut qa = record("qa", "Integration Testing", 14, 20);
        qa.dependencies = Some(DependencyList::Text("backend, frontend".into()));
        qa.swimlane = Some("Engineering".into());

        let release = record("release", "Release", 20, 21);

        vec![kickoff, requirements, design, backend, frontend, qa, release]
    }

    fn open_json(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        else {
            return;
        };
        match io::load_tasks(&path) {
            Ok(records) => {
                let count = records.len();
                self.gantt.refresh(records);
                self.status_message = format!("Loaded {count} task(s) from {}", path.display());
            }
            Err(err) => {
                log::error!("loading tasks failed: {err:#}");
                self.status_message = format!("Load failed: {err}");
            }
        }
    }

    fn import_csv(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv", "tsv", "txt"])
            .pick_file()
        else {
            return;
        };
        match io::import_csv(&path) {
            Ok(records) => {
                let count = records.len();
                self.gantt.refresh(records);
                self.status_message = format!("Imported {count} task(s) from {}", path.display());
            }
            Err(err) => {
                log::error!("CSV import failed: {err:#}");
                self.status_message = format!("Import failed: {err}");
            }
        }
    }

    fn describe(&self, event: &GanttEvent) -> String {
        match event {
            GanttEvent::ViewChange(mode) => format!("View: {}", mode.label()),
            GanttEvent::DateChange {
                task_id,
                start,
                end,
            } => {
                format!(
                    "{task_id}: {} → {}",
                    start.format("%Y-%m-%d"),
                    end.format("%Y-%m-%d")
                )
            }
            GanttEvent::ProgressChange { task_id, progress } => {
                format!("{task_id}: {progress}% complete")
            }
            GanttEvent::DependencyAdded { from } => format!("New dependency on {from}"),
            GanttEvent::DependencyDeleted { from, to } => {
                format!("Dependency {from} → {to} removed")
            }
            GanttEvent::Click { task_id } => format!("Selected {task_id}"),
        }
    }
}

impl eframe::App for GanttApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            match ui::show_toolbar(&mut self.gantt, ui) {
                Some(ToolbarAction::OpenJson) => self.open_json(),
                Some(ToolbarAction::ImportCsv) => self.import_csv(),
                None => {}
            }
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(&self.status_message);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui::show_gantt(&mut self.gantt, ui);
        });

        for event in self.gantt.take_events() {
            log::info!("{event:?}");
            self.status_message = self.describe(&event);
        }
    }
}
