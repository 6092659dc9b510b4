//! Result Evaluator - Graphical User Interface
//!
//! One-page dashboard: upload result files, pick a category and top-N,
//! then browse the ranking as a table, as charts, or one student at a time.

use iced::widget::canvas::{self, Canvas, Frame, Geometry, Path};
use iced::widget::{
    button, column, container, pick_list, row, rule, scrollable, text, Text,
};
use iced::{
    mouse, Center, Color, Element, Fill, Pixels, Point, Radians, Rectangle, Renderer, Size, Task,
    Theme,
};
use result_evaluator::chart::{BarChart, PieChart, Rgb};
use result_evaluator::config::Settings;
use result_evaluator::export::{write_csv_file, write_workbook, ExportShape};
use result_evaluator::pipeline;
use result_evaluator::table::format_number;
use result_evaluator::{Category, RankedView, ResultSet, TopN, ViewState};
use std::f32::consts::FRAC_PI_2;
use std::path::PathBuf;

const RESULT_EXTENSIONS: [&str; 9] = [
    "csv", "tsv", "tab", "txt", "xlsx", "xlsm", "xlsb", "xls", "ods",
];

fn main() -> iced::Result {
    env_logger::init();
    iced::application(App::new, App::update, App::view)
        .theme(App::theme)
        .centered()
        .run()
}

// ============================================================================
// App State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TabId {
    Rankings,
    Charts,
    Student,
}

struct App {
    active_tab: TabId,
    settings: Settings,

    inputs: Vec<PathBuf>,
    results: Option<ResultSet>,
    state: ViewState,

    is_loading: bool,
    status_text: String,
    status_is_error: bool,
}

impl App {
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let state = ViewState::new(settings.default_category, settings.default_top);
        (
            App {
                active_tab: TabId::Rankings,
                settings,
                inputs: Vec::new(),
                results: None,
                state,
                is_loading: false,
                status_text: "Upload one or more result files to begin.".to_string(),
                status_is_error: false,
            },
            Task::none(),
        )
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_text = message.into();
        self.status_is_error = false;
    }

    fn set_error(&mut self, message: impl std::fmt::Display) {
        self.status_text = format!("Error: {}", message);
        self.status_is_error = true;
    }

    /// Persist the current selections as the next session's defaults.
    fn save_settings(&mut self) {
        self.settings.default_category = self.state.category();
        self.settings.default_top = self.state.top_n();
        self.settings.save();
    }
}

fn summarize_inputs(inputs: &[PathBuf]) -> String {
    match inputs {
        [] => String::new(),
        [single] => file_label(single),
        _ => {
            let names: Vec<String> = inputs.iter().map(|p| file_label(p)).collect();
            format!("{} files: {}", inputs.len(), names.join(", "))
        }
    }
}

fn file_label(path: &std::path::Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone)]
enum Message {
    TabSelected(TabId),

    // Upload
    BrowseInputs,
    InputsSelected(Option<Vec<PathBuf>>),
    Loaded(Vec<PathBuf>, Result<ResultSet, String>),

    // Selectors
    CategorySelected(Category),
    TopNSelected(TopN),

    // Record inspector
    Previous,
    Next,

    // Export
    BrowseCsvOutput,
    CsvOutputSelected(Option<PathBuf>),
    BrowseWorkbookOutput,
    WorkbookOutputSelected(Option<PathBuf>),
}

// ============================================================================
// Update
// ============================================================================

impl App {
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.active_tab = tab;
                Task::none()
            }

            // -- Upload --
            Message::BrowseInputs => {
                let start_dir = self.settings.last_dir.clone();
                Task::perform(
                    async move {
                        let mut dialog = rfd::AsyncFileDialog::new()
                            .set_title("Select result files")
                            .add_filter("Result files", &RESULT_EXTENSIONS)
                            .add_filter("CSV / TSV", &["csv", "tsv", "tab", "txt"])
                            .add_filter("Spreadsheets", &["xlsx", "xlsm", "xlsb", "xls", "ods"]);
                        if let Some(dir) = start_dir {
                            dialog = dialog.set_directory(dir);
                        }
                        dialog
                            .pick_files()
                            .await
                            .map(|files| {
                                files
                                    .iter()
                                    .map(|f| f.path().to_path_buf())
                                    .collect::<Vec<_>>()
                            })
                    },
                    Message::InputsSelected,
                )
            }
            Message::InputsSelected(paths) => {
                let paths = match paths {
                    Some(p) if !p.is_empty() => p,
                    _ => return Task::none(),
                };
                if let Some(dir) = paths[0].parent() {
                    self.settings.last_dir = Some(dir.to_path_buf());
                    self.settings.save();
                }
                self.is_loading = true;
                self.set_status(format!("Loading {}...", summarize_inputs(&paths)));
                Task::perform(
                    async move {
                        let result =
                            pipeline::load_results(&paths).map_err(|e| format!("{:#}", e));
                        (paths, result)
                    },
                    |(paths, result)| Message::Loaded(paths, result),
                )
            }
            Message::Loaded(paths, result) => {
                self.is_loading = false;
                match result {
                    Ok(results) => {
                        self.inputs = paths;
                        let shown = self.state.refresh(&results).len();
                        let mut status = format!(
                            "Loaded {} students from {}; showing {}.",
                            results.len(),
                            results.sources().join(", "),
                            shown
                        );
                        if !results.coerced().is_empty() {
                            status.push_str(&format!(
                                " {} non-numeric answer(s) counted as 0.",
                                results.coerced().len()
                            ));
                        }
                        self.results = Some(results);
                        self.set_status(status);
                    }
                    // The previous upload stays on screen.
                    Err(e) => self.set_error(e),
                }
                Task::none()
            }

            // -- Selectors --
            Message::CategorySelected(category) => {
                if let Some(results) = &self.results {
                    self.state.select_category(category, results);
                } else {
                    self.state = ViewState::new(category, self.state.top_n());
                }
                self.save_settings();
                Task::none()
            }
            Message::TopNSelected(top_n) => {
                if let Some(results) = &self.results {
                    self.state.select_top_n(top_n, results);
                } else {
                    self.state = ViewState::new(self.state.category(), top_n);
                }
                self.save_settings();
                Task::none()
            }

            // -- Record inspector --
            Message::Previous => {
                self.state.previous();
                Task::none()
            }
            Message::Next => {
                self.state.next();
                Task::none()
            }

            // -- Export --
            Message::BrowseCsvOutput => {
                let name = format!("results_{}.csv", self.state.category().key());
                Task::perform(
                    async move {
                        let file = rfd::AsyncFileDialog::new()
                            .add_filter("CSV files", &["csv"])
                            .set_file_name(name)
                            .save_file()
                            .await;
                        file.map(|f| f.path().to_path_buf())
                    },
                    Message::CsvOutputSelected,
                )
            }
            Message::CsvOutputSelected(path) => {
                let (Some(path), Some(results)) = (path, &self.results) else {
                    return Task::none();
                };
                let outcome = {
                    let view = self.state.view(results);
                    write_csv_file(&view, results, ExportShape::Full, &path).map(|()| view.len())
                };
                match outcome {
                    Ok(rows) => self.set_status(format!("Wrote {} rows to {}", rows, path.display())),
                    Err(e) => self.set_error(format!("{:#}", e)),
                }
                Task::none()
            }
            Message::BrowseWorkbookOutput => Task::perform(
                async {
                    let file = rfd::AsyncFileDialog::new()
                        .add_filter("Excel files", &["xlsx"])
                        .set_file_name("results.xlsx")
                        .save_file()
                        .await;
                    file.map(|f| f.path().to_path_buf())
                },
                Message::WorkbookOutputSelected,
            ),
            Message::WorkbookOutputSelected(path) => {
                let (Some(path), Some(results)) = (path, &self.results) else {
                    return Task::none();
                };
                match write_workbook(results, &path) {
                    Ok(()) => self.set_status(format!(
                        "Workbook with {} students saved to {}",
                        results.len(),
                        path.display()
                    )),
                    Err(e) => self.set_error(format!("{:#}", e)),
                }
                Task::none()
            }
        }
    }
}

// ============================================================================
// View
// ============================================================================

impl App {
    fn view(&self) -> Element<'_, Message> {
        let title = text("Result Evaluator").size(28);

        let mut upload = button(text("Upload results"));
        if !self.is_loading {
            upload = upload.on_press(Message::BrowseInputs);
        }
        let has_results = self.results.is_some() && !self.is_loading;
        let mut save_csv = button(text("Save CSV").size(13));
        let mut save_xlsx = button(text("Save workbook").size(13));
        if has_results {
            save_csv = save_csv.on_press(Message::BrowseCsvOutput);
            save_xlsx = save_xlsx.on_press(Message::BrowseWorkbookOutput);
        }

        let toolbar = row![
            upload,
            text(summarize_inputs(&self.inputs)).size(13).width(Fill),
            save_csv,
            save_xlsx,
        ]
        .spacing(10)
        .align_y(Center);

        let selectors = row![
            text("Category:").width(80),
            pick_list(
                Category::ALL,
                Some(self.state.category()),
                Message::CategorySelected
            )
            .width(320),
            text("Top:").width(40),
            pick_list(TopN::CHOICES, Some(self.state.top_n()), Message::TopNSelected).width(90),
        ]
        .spacing(10)
        .align_y(Center);

        let tab_bar = row![
            tab_button("Rankings", TabId::Rankings, self.active_tab),
            tab_button("Charts", TabId::Charts, self.active_tab),
            tab_button("Student", TabId::Student, self.active_tab),
        ]
        .spacing(4);

        let content: Element<'_, Message> = match &self.results {
            None => text("No results loaded.").size(14).into(),
            Some(results) => {
                let view = self.state.view(results);
                match self.active_tab {
                    TabId::Rankings => self.view_rankings(&view),
                    TabId::Charts => view_charts(&view),
                    TabId::Student => self.view_student(&view),
                }
            }
        };

        let status_color = if self.status_is_error {
            Color::from_rgb(0.95, 0.4, 0.4)
        } else {
            Color::from_rgb(0.4, 0.9, 0.4)
        };

        column![
            container(column![title, toolbar, selectors].spacing(12)).padding([16, 20]),
            container(tab_bar).padding([0, 20]),
            rule::horizontal(1),
            container(content).padding(20).width(Fill).height(Fill),
            rule::horizontal(1),
            container(text(&self.status_text).size(13).color(status_color)).padding([6, 20]),
        ]
        .into()
    }

    // -- Rankings tab --
    fn view_rankings(&self, view: &RankedView<'_>) -> Element<'_, Message> {
        if view.is_empty() {
            return text("No students in this view.").size(14).into();
        }
        let category = view.category();
        let header = row![
            text("Rank").width(60),
            text("Student name").width(Fill),
            text("Email").width(Fill),
            text(category.label()).width(280),
        ]
        .spacing(10);

        let mut rows = column![].spacing(4);
        for entry in view.entries() {
            let highlight = entry.rank == self.state.rank();
            let cell = |s: String| {
                let t: Text<'_> = text(s).size(13);
                if highlight {
                    t.color(Color::from_rgb8(0xf4, 0xa3, 0x03))
                } else {
                    t
                }
            };
            rows = rows.push(
                row![
                    cell(entry.rank.to_string()).width(60),
                    cell(entry.record.name().to_string()).width(Fill),
                    cell(entry.record.email().to_string()).width(Fill),
                    cell(format_number(entry.score(category))).width(280),
                ]
                .spacing(10),
            );
        }

        column![header, rule::horizontal(1), scrollable(rows).height(Fill)]
            .spacing(6)
            .into()
    }

    // -- Student tab --
    fn view_student(&self, view: &RankedView<'_>) -> Element<'_, Message> {
        let Some(entry) = self.state.current(view) else {
            return text("No students in this view.").size(14).into();
        };
        let card = match pipeline::format_record(entry, view.category(), view.len()) {
            Ok(s) => s,
            Err(e) => format!("Error: {}", e),
        };

        let cursor = self.state.cursor();
        let mut prev = button(text("Previous"));
        if !cursor.at_first() {
            prev = prev.on_press(Message::Previous);
        }
        let mut next = button(text("Next"));
        if !cursor.at_last() {
            next = next.on_press(Message::Next);
        }

        column![
            row![prev, text(format!("{} / {}", cursor.rank(), cursor.total())), next]
                .spacing(12)
                .align_y(Center),
            scrollable(
                container(text(card).size(13).font(iced::Font::MONOSPACE)).padding(8)
            )
            .height(Fill),
        ]
        .spacing(12)
        .into()
    }
}

// -- Charts tab --
fn view_charts<'a>(view: &RankedView<'_>) -> Element<'a, Message> {
    let bars = BarChart::from_view(view);
    let pie = PieChart::from_view(view);

    let legend = if pie.is_empty() {
        column![text(pie.describe()).size(13)]
    } else {
        pie.slices.iter().fold(column![].spacing(4), |col, slice| {
            col.push(
                row![
                    container(text(""))
                        .width(12)
                        .height(12)
                        .style(swatch(slice.color)),
                    text(slice.legend()).size(12),
                ]
                .spacing(6)
                .align_y(Center),
            )
        })
    };

    column![
        text(format!("Performance: {}", bars.title)).size(16),
        Canvas::new(BarCanvas { chart: bars }).width(Fill).height(260),
        text(pie.title.clone()).size(16),
        row![
            Canvas::new(PieCanvas { chart: pie }).width(260).height(260),
            scrollable(legend).height(260).width(Fill),
        ]
        .spacing(20),
    ]
    .spacing(10)
    .into()
}

// ============================================================================
// Chart canvases
// ============================================================================

fn to_color(rgb: Rgb) -> Color {
    let [r, g, b] = rgb.to_f32();
    Color::from_rgb(r, g, b)
}

struct BarCanvas {
    chart: BarChart,
}

impl<Message> canvas::Program<Message> for BarCanvas {
    type State = ();

    fn draw(
        &self,
        _state: &(),
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let count = self.chart.bars.len();
        if count == 0 {
            return vec![frame.into_geometry()];
        }

        let label_space = 18.0;
        let plot_height = (bounds.height - 2.0 * label_space).max(0.0);
        let slot = bounds.width / count as f32;
        let bar_width = (slot * 0.7).max(1.0);

        for (idx, bar) in self.chart.bars.iter().enumerate() {
            let height = bar.height * plot_height;
            let x = idx as f32 * slot + (slot - bar_width) / 2.0;
            let top = label_space + plot_height - height;
            frame.fill_rectangle(Point::new(x, top), Size::new(bar_width, height), to_color(bar.color));

            frame.fill_text(canvas::Text {
                content: format_number(bar.value),
                position: Point::new(x, top - 14.0),
                color: Color::WHITE,
                size: Pixels(11.0),
                ..canvas::Text::default()
            });
            // Labels only fit when the bars are wide enough.
            if slot >= 40.0 {
                let label: String = bar.label.chars().take((slot / 7.0) as usize).collect();
                frame.fill_text(canvas::Text {
                    content: label,
                    position: Point::new(x, label_space + plot_height + 3.0),
                    color: Color::from_rgb(0.8, 0.8, 0.8),
                    size: Pixels(11.0),
                    ..canvas::Text::default()
                });
            }
        }

        vec![frame.into_geometry()]
    }
}

struct PieCanvas {
    chart: PieChart,
}

impl<Message> canvas::Program<Message> for PieCanvas {
    type State = ();

    fn draw(
        &self,
        _state: &(),
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let center = frame.center();
        let radius = frame.width().min(frame.height()) / 2.0 - 4.0;

        for slice in &self.chart.slices {
            // Slice angles start at 12 o'clock; canvas angles at 3 o'clock.
            let path = Path::new(|b| {
                b.move_to(center);
                b.arc(canvas::path::Arc {
                    center,
                    radius,
                    start_angle: Radians(slice.start_angle - FRAC_PI_2),
                    end_angle: Radians(slice.end_angle - FRAC_PI_2),
                });
                b.close();
            });
            frame.fill(&path, to_color(slice.color));
        }

        vec![frame.into_geometry()]
    }
}

// ============================================================================
// Helper widgets
// ============================================================================

/// Render a tab button, styled differently when active.
fn tab_button(label: &str, tab: TabId, active: TabId) -> Element<'_, Message> {
    let btn = button(text(label).size(14));
    if tab == active {
        btn.style(button::primary).into()
    } else {
        btn.on_press(Message::TabSelected(tab))
            .style(button::secondary)
            .into()
    }
}

/// Solid color square for the pie legend.
fn swatch(rgb: Rgb) -> impl Fn(&Theme) -> container::Style {
    move |_theme| container::Style::default().background(to_color(rgb))
}
