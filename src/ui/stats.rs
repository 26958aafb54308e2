//! Stats table rendering.
//!
//! Draws the visible node's [`StatsTable`](crate::data::StatsTable): flat
//! rows, tab group headings with indented nested rows, and a plot toggle
//! column.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Text,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::table::NO_PLOT;
use crate::data::{PlotControl, TableRow};

/// Text of a row's plot toggle cell.
pub fn plot_marker(plot: PlotControl) -> &'static str {
    match plot {
        PlotControl::Toggle { pressed: true } => "[x]",
        PlotControl::Toggle { pressed: false } => "[ ]",
        PlotControl::Unavailable => NO_PLOT,
    }
}

/// Render the stats table of the current node.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(node) = app.current_node() else {
        frame.render_widget(block.title(" Statistics "), area);
        return;
    };

    let Some(table) = app.console.table(node) else {
        let waiting = ratatui::widgets::Paragraph::new(" Waiting for statistics...")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block.title(format!(" {} ", node)));
        frame.render_widget(waiting, area);
        return;
    };

    let header = Row::new(vec![
        Cell::from("Statistic"),
        Cell::from("Value"),
        Cell::from("Plot"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = table
        .rows()
        .iter()
        .map(|row| match row {
            TableRow::Heading(title) => Row::new(vec![
                Cell::from(title.clone()),
                Cell::from(""),
                Cell::from(""),
            ])
            .style(app.theme.header.add_modifier(Modifier::UNDERLINED)),
            TableRow::Stat(stat) => {
                let label = if stat.nested {
                    format!("  {}", stat.label)
                } else {
                    stat.label.clone()
                };
                Row::new(vec![
                    Cell::from(label),
                    Cell::from(Text::from(stat.value.lines().join("\n"))),
                    Cell::from(plot_marker(stat.plot)).style(app.theme.plot_style(stat.plot)),
                ])
                .height(stat.value.height())
            }
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(3),
        Constraint::Length(4),
    ];

    let plotted = app.console.selection().selected(node).count();
    let title = format!(" {} [{} plotted] ", node, plotted);

    let table_widget = Table::new(rows, widths)
        .header(header)
        .block(block.title(title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_row.min(table.len().saturating_sub(1))));

    frame.render_stateful_widget(table_widget, area, &mut state);
}
