use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Transcript labels
    pub user_label_style: Style,
    pub assistant_label_style: Style,
    pub message_text_style: Style,

    // Chrome
    pub title_style: Style,
    pub streaming_indicator_style: Style,
    pub prompt_style: Style,
    pub disabled_prompt_style: Style,
    pub input_text_style: Style,
    pub error_style: Style,

    // Palette
    pub palette_border_style: Style,
    pub palette_title_style: Style,
    pub palette_selected_style: Style,
    pub palette_help_style: Style,
    pub palette_hint_style: Style,

    // Markdown
    pub md_h1_style: Style,
    pub md_h2_style: Style,
    pub md_h3_style: Style,
    pub md_inline_code_style: Style,
    pub md_codeblock_fence_style: Style,
    pub md_codeblock_text_style: Style,
    pub md_link_style: Style,
    pub md_list_marker_style: Style,
}

impl Theme {
    /// 256-color palette: 86 for accents, 241 for secondary text, 196 for errors.
    pub fn dark_default() -> Self {
        let accent = Color::Indexed(86);
        let secondary = Color::Indexed(241);

        Theme {
            user_label_style: Style::default()
                .fg(Color::Indexed(255))
                .bg(Color::Indexed(57))
                .add_modifier(Modifier::BOLD),
            assistant_label_style: Style::default()
                .fg(Color::Indexed(255))
                .bg(Color::Indexed(63))
                .add_modifier(Modifier::BOLD),
            message_text_style: Style::default(),

            title_style: Style::default().fg(secondary),
            streaming_indicator_style: Style::default().fg(accent),
            prompt_style: Style::default().fg(accent),
            disabled_prompt_style: Style::default().fg(secondary),
            input_text_style: Style::default(),
            error_style: Style::default().fg(Color::Indexed(196)),

            palette_border_style: Style::default().fg(secondary),
            palette_title_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            palette_selected_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            palette_help_style: Style::default().fg(secondary),
            palette_hint_style: Style::default()
                .fg(secondary)
                .add_modifier(Modifier::ITALIC),

            md_h1_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            md_h2_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            md_h3_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            md_inline_code_style: Style::default().fg(Color::Green),
            md_codeblock_fence_style: Style::default().fg(Color::Yellow),
            md_codeblock_text_style: Style::default().fg(Color::DarkGray),
            md_link_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            md_list_marker_style: Style::default().fg(accent),
        }
    }

    pub fn md_heading_style(&self, level: u8) -> Style {
        match level {
            1 => self.md_h1_style,
            2 => self.md_h2_style,
            _ => self.md_h3_style,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_default()
    }
}
