//! Terminal UI rendering — status bar, activity log, agent card, and prompt.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::agent::{Agent, BodyColor};
use crate::session::{Settlement, SuggestionState};
use crate::store::AgentStore;

use super::App;

impl App {
    /// Render the full TUI frame.
    pub fn draw(&mut self, frame: &mut Frame<'_>) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(3),
            ])
            .split(frame.area());
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);

        frame.render_widget(Paragraph::new(self.status_line()), rows[0]);
        self.draw_activity(frame, columns[0]);
        self.draw_agent_card(frame, columns[1]);

        // ── Input prompt ─────────────────────────────────────────────
        let input_panel = Paragraph::new(self.input.as_str())
            .block(Block::default().borders(Borders::ALL).title("Command"));
        frame.render_widget(input_panel, rows[2]);

        let input_width = rows[2].width.saturating_sub(2) as usize;
        let cursor = self.cursor_column().min(input_width);
        frame.set_cursor_position(Position::new(
            rows[2].x + 1 + cursor as u16,
            rows[2].y + 1,
        ));
    }

    fn status_line(&self) -> Line<'static> {
        let agent_name = self
            .store_current_name()
            .unwrap_or_else(|| "none".to_string());
        let mut spans = vec![
            Span::styled("Agent: ", Style::default().fg(Color::DarkGray)),
            Span::styled(agent_name, Style::default().fg(Color::Magenta)),
            Span::styled("  Suggest: ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.suggester.label(), Style::default().fg(self.provider_color())),
            Span::styled(
                format!("  Agents: {}", self.store.len()),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if self.session.is_some() {
            spans.push(Span::styled("  ✏️ editing", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    }

    fn draw_activity(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let inner_width = area.width.saturating_sub(2);
        let inner_height = area.height.saturating_sub(2) as usize;

        let log_lines: Vec<Line> = self.logs.iter().map(|l| l.render()).collect();
        let log_paragraph = Paragraph::new(Text::from(log_lines)).wrap(Wrap { trim: true });

        let total_visual = log_paragraph.line_count(inner_width);
        let max_scroll = total_visual.saturating_sub(inner_height);
        if (self.scroll_offset as usize) > max_scroll {
            self.scroll_offset = max_scroll as u16;
        }
        let top_row = max_scroll.saturating_sub(self.scroll_offset as usize) as u16;

        let title = if self.scroll_offset > 0 {
            format!(" Activity [↑{}] ", self.scroll_offset)
        } else {
            " Activity ".to_string()
        };
        let panel = log_paragraph
            .block(Block::default().borders(Borders::ALL).title(title))
            .scroll((top_row, 0));
        frame.render_widget(panel, area);
    }

    fn draw_agent_card(&self, frame: &mut Frame<'_>, area: Rect) {
        let title = if self.session.is_some() {
            " Edit agent "
        } else {
            " Agent "
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        let Some(agent) = self.displayed_agent() else {
            frame.render_widget(Paragraph::new("No agent.").block(block), area);
            return;
        };
        let text = Text::from(self.card_lines(&agent));
        frame.render_widget(
            Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }

    fn card_lines(&self, agent: &Agent) -> Vec<Line<'static>> {
        let label = Style::default().fg(Color::DarkGray);
        let name = if agent.name.is_empty() {
            Span::styled("(name)", label)
        } else {
            Span::styled(
                agent.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )
        };

        let mut lines = vec![
            Line::from(name),
            Line::from(""),
            Line::from(vec![
                Span::styled("Color  ", label),
                Span::styled("████ ", Style::default().fg(swatch(agent.body_color))),
                Span::raw(agent.body_color.to_string()),
            ]),
            Line::from(vec![
                Span::styled("Voice  ", label),
                Span::raw(agent.voice.to_string()),
            ]),
            Line::from(""),
            Line::from(Span::styled("Personality", label)),
        ];
        if agent.personality.is_empty() {
            lines.push(Line::from(Span::styled(
                "How should I act? What's my purpose?",
                label.add_modifier(Modifier::ITALIC),
            )));
        } else {
            lines.extend(agent.personality.lines().map(|l| Line::from(l.to_string())));
        }

        if let Some(session) = &self.session {
            lines.push(Line::from(""));
            let state = session.state();
            let suggest = if state == SuggestionState::Pending {
                Span::styled("✨ Thinking...", Style::default().fg(Color::Yellow))
            } else if agent.name.trim().is_empty() {
                Span::styled("✨ Suggest (needs a name)", label)
            } else {
                Span::styled("✨ /suggest with AI", Style::default().fg(Color::Cyan))
            };
            lines.push(Line::from(suggest));
            if let SuggestionState::Settled(Settlement::Failed(error)) = state {
                lines.push(Line::from(Span::styled(
                    error,
                    Style::default().fg(Color::Red),
                )));
            }
        }
        lines
    }

    // ── Status-bar helpers ───────────────────────────────────────────

    fn store_current_name(&self) -> Option<String> {
        self.store.current().map(|agent| agent.name)
    }

    fn provider_color(&self) -> Color {
        if self.provider.api_key.is_some() {
            Color::Green
        } else {
            Color::DarkGray
        }
    }
}

fn swatch(color: BodyColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use crate::app::tests::test_app;

    fn card_text(app: &crate::app::App) -> String {
        let agent = app.displayed_agent().unwrap();
        app.card_lines(&agent)
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn card_shows_fields_and_suggest_hint() {
        let mut app = test_app();
        assert!(!card_text(&app).contains("/suggest"));

        app.handle_command("/edit").unwrap();
        let text = card_text(&app);
        assert!(text.contains("Zeke"));
        assert!(text.contains("#4285f4"));
        assert!(text.contains("Puck"));
        assert!(text.contains("old text"));
        assert!(text.contains("/suggest with AI"));

        app.handle_command("/name").unwrap();
        assert!(card_text(&app).contains("needs a name"));
    }
}
