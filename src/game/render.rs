//! Tap Earn rendering: header, tab bar, one screen per tab, message log.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ClickableList, TabBar};

use super::actions::*;
use super::economy::format_coins;
use super::leaderboard::{rank_of, Board};
use super::missions;
use super::state::{BoosterKind, Currency};
use super::{LogKind, Tab, TapGame, RECHARGE_LARGE_COINS, RECHARGE_SMALL_COINS};

/// Hen art, 4 lines x 9 cols.
const HEN_ART: &[&str] = &["   ,~.   ", "  (o o)> ", "  /|_|\\  ", "   ^ ^   "];

/// Hen art while a tap is flashing.
const HEN_TAP_ART: &[&str] = &["   ,~.  *", "  (^ ^)>*", " </|_|\\> ", "   ^ ^   "];

/// Log panel is shown beside the content from this width on.
const WIDE_LOG_WIDTH: u16 = 80;

/// Wallet history rows shown.
const HISTORY_ROWS: usize = 5;

pub fn render(game: &TapGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let (main_area, log_area) = if area.width >= WIDE_LOG_WIDTH {
        let h_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);
        (h_chunks[0], Some(h_chunks[1]))
    } else {
        (area, None)
    };

    let status_height = if log_area.is_some() { 0 } else { 1 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),             // header
            Constraint::Length(3),             // tab bar
            Constraint::Min(6),                // content
            Constraint::Length(status_height), // last log line on narrow screens
        ])
        .split(main_area);

    render_header(game, f, chunks[0]);
    render_tab_bar(game, f, chunks[1], click_state);
    match game.tab {
        Tab::Mine => render_mine(game, f, chunks[2], click_state),
        Tab::Boost => render_boost(game, f, chunks[2], click_state),
        Tab::Rewards => render_rewards(game, f, chunks[2], click_state),
        Tab::Ranking => render_ranking(game, f, chunks[2], click_state),
        Tab::Wallet => render_wallet(game, f, chunks[2], click_state),
    }

    match log_area {
        Some(log_area) => render_log(game, f, log_area),
        None => render_status(game, f, chunks[3]),
    }
}

fn log_style(kind: LogKind) -> Style {
    match kind {
        LogKind::Info => Style::default().fg(Color::White),
        LogKind::Important => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        LogKind::Error => Style::default().fg(Color::Red),
    }
}

/// Text progress bar, `width` cells wide.
fn bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn render_header(game: &TapGame, f: &mut Frame, area: Rect) {
    let s = game.session.state();
    let name_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let coin_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let lines = if is_narrow_layout(area.width) {
        vec![
            Line::from(vec![
                Span::styled(s.account.display_name.clone(), name_style),
                Span::styled(format!(" Lv.{}", s.level.level), Style::default().fg(Color::Green)),
            ]),
            Line::from(Span::styled(
                format!("🪙 {}", format_coins(s.economy.coin_balance)),
                coin_style,
            )),
        ]
    } else {
        vec![
            Line::from(vec![
                Span::styled(s.account.display_name.clone(), name_style),
                Span::styled(format!("  Lv.{}", s.level.level), Style::default().fg(Color::Green)),
                Span::styled(
                    format!("  mined {}", format_coins(s.economy.total_mined_coins)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
            Line::from(Span::styled(
                format!("🪙 {} coins", format_coins(s.economy.coin_balance)),
                coin_style,
            )),
        ]
    };

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Tap Earn "),
    );
    f.render_widget(widget, area);
}

fn render_tab_bar(
    game: &TapGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let ready = game.session.claimable_level_rewards().len();
    let tab_style = |tab: Tab| -> Style {
        if tab == game.tab {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else if tab == Tab::Rewards && ready > 0 {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Yellow)
        }
    };

    let mut tabs = TabBar::new("│");
    for (i, &tab) in Tab::all().iter().enumerate() {
        let label = if tab == Tab::Rewards && ready > 0 {
            format!("{} {}({ready})", i + 1, tab.label())
        } else {
            format!("{} {}", i + 1, tab.label())
        };
        tabs = tabs.tab(label, tab_style(tab), tab.action_id());
    }
    let mut cs = click_state.borrow_mut();
    tabs.block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .render(f, area, &mut cs);
}

fn render_mine(
    game: &TapGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let s = game.session.state();
    let eco = &s.economy;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(4)])
        .split(area);

    // Tap button
    let flashing = game.tap_flash > 0;
    let art = if flashing { HEN_TAP_ART } else { HEN_ART };
    let art_style = if flashing {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let mut lines: Vec<Line> = art
        .iter()
        .map(|row| Line::from(Span::styled(*row, art_style)))
        .collect();
    let caption = if flashing {
        Span::styled(
            format!("+{}", format_coins(game.last_earned)),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("tap the hen (Space)", Style::default().fg(Color::DarkGray))
    };
    lines.push(Line::from(caption));

    let border_color = if flashing { Color::Yellow } else { Color::Green };
    let button = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color)),
    );
    f.render_widget(button, chunks[0]);
    click_state.borrow_mut().add_click_target(chunks[0], TAP);

    // Gauges
    let width = chunks[1].width.saturating_sub(20).clamp(5, 30) as usize;
    let energy_pct = if eco.energy_max == 0 {
        0.0
    } else {
        eco.energy_current as f64 * 100.0 / eco.energy_max as f64
    };
    let energy_color = if eco.energy_current < eco.tap_value {
        Color::Red
    } else {
        Color::Cyan
    };
    let progress = game.session.progress_percent();
    let curve = game.session.curve();
    let level_line = if s.level.level >= curve.max_level() {
        Line::from(Span::styled("Max level", Style::default().fg(Color::Green)))
    } else {
        Line::from(vec![
            Span::styled("Level ", Style::default().fg(Color::White)),
            Span::styled(bar(progress, width), Style::default().fg(Color::Green)),
            Span::styled(
                format!(" {} to Lv.{}", format_coins(game.session.coins_to_rank_up()), s.level.level + 1),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    };
    let combo = game.session.combo();
    let combo_len = game.session.config().combo.length;
    let gauges = vec![
        Line::from(vec![
            Span::styled("Energy ", Style::default().fg(Color::White)),
            Span::styled(bar(energy_pct, width), Style::default().fg(energy_color)),
            Span::styled(
                format!(" {}/{}", format_coins(eco.energy_current), format_coins(eco.energy_max)),
                Style::default().fg(energy_color),
            ),
        ]),
        level_line,
        Line::from(Span::styled(
            format!(
                "+{} per tap  combo {}/{}",
                eco.tap_value, combo.count, combo_len
            ),
            Style::default().fg(Color::Magenta),
        )),
    ];
    let widget = Paragraph::new(gauges).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(widget, chunks[1]);
}

fn render_boost(
    game: &TapGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let s = game.session.state();
    let cfg = game.session.config();
    let mut cl = ClickableList::new();

    cl.push(Line::from(Span::styled(
        "Boosters",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
    for (i, &kind) in BoosterKind::all().iter().enumerate() {
        let track = s.boosters.track(kind);
        let affordable = s.economy.coin_balance >= track.next_cost;
        let key = match kind {
            BoosterKind::Multitap => 'M',
            BoosterKind::EnergyLimit => 'E',
        };
        let key_style = if affordable {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let text_style = if affordable {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let line = Line::from(vec![
            Span::styled(format!(" [{key}] "), key_style),
            Span::styled(format!("{:<13} Lv.{:<3}", kind.name(), track.level), text_style),
            Span::styled(format!(" {} coins", format_coins(track.next_cost)), text_style),
            Span::styled(
                format!("  {}", kind.description(&cfg.boosters)),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        cl.push_clickable(line, BUY_BOOSTER_BASE + i as u16);
    }

    cl.push(Line::from(""));
    let left = s.boosters.free_boosts_remaining;
    let free_style = if left > 0 {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    cl.push_clickable(
        Line::from(Span::styled(
            format!(" [F] Full energy  {left}/{} free today", cfg.boosters.free_boosts_per_day),
            free_style,
        )),
        FREE_BOOST,
    );

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1, 0, 0);
    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(" Boost "),
    );
    f.render_widget(widget, area);
}

fn render_rewards(
    game: &TapGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let s = game.session.state();
    let cfg = game.session.config();
    let mut cl = ClickableList::new();

    let claimed_today = s.rewards.last_daily_claim == Some(game.session.today());
    let daily_style = if claimed_today {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    };
    let daily_text = if claimed_today {
        format!(" [D] Daily reward claimed  streak {} days", s.rewards.login_streak_days)
    } else {
        format!(
            " [D] Claim daily reward +{}  streak {} days",
            cfg.rewards.daily_base, s.rewards.login_streak_days
        )
    };
    cl.push_clickable(Line::from(Span::styled(daily_text, daily_style)), CLAIM_DAILY);

    cl.push(Line::from(""));
    cl.push(Line::from(Span::styled(
        "Level rewards (L claims the next one)",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
    for (i, tier) in cfg.rewards.level_tiers.iter().enumerate() {
        let claimed = s.rewards.claimed_level_rewards.contains(&tier.level);
        let (status, style) = if claimed {
            ("✓ claimed", Style::default().fg(Color::DarkGray))
        } else if s.level.level >= tier.level {
            (
                "▶ ready",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            ("locked", Style::default().fg(Color::DarkGray))
        };
        cl.push_clickable(
            Line::from(Span::styled(
                format!(
                    "  Lv.{:<3} {:>9} coins  {status}",
                    tier.level,
                    format_coins(tier.reward)
                ),
                style,
            )),
            CLAIM_LEVEL_BASE + i as u16,
        );
    }

    let visible = missions::available(&s.missions, s.level.level);
    if !visible.is_empty() {
        cl.push(Line::from(""));
        cl.push(Line::from(Span::styled(
            "Missions",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        for m in visible {
            let (mark, style) = if m.completed {
                ("✓", Style::default().fg(Color::DarkGray))
            } else {
                ("·", Style::default().fg(Color::White))
            };
            cl.push(Line::from(Span::styled(
                format!("  {mark} {}  {} (+{})", m.title, m.description, format_coins(m.reward)),
                style,
            )));
        }
    }

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1, 0, 0);
    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(" Rewards "),
    );
    f.render_widget(widget, area);
}

fn render_ranking(
    game: &TapGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    let board_style = |board: Board| -> Style {
        if board == game.board {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        }
    };
    {
        let mut cs = click_state.borrow_mut();
        TabBar::new(" ")
            .tab("C Top Coins", board_style(Board::Coins), BOARD_COINS)
            .tab("L Top Level", board_style(Board::Level), BOARD_LEVEL)
            .render(f, chunks[0], &mut cs);
    }

    let me = game.session.uid();
    let visible = chunks[1].height.saturating_sub(2) as usize;
    let mut lines: Vec<Line> = game
        .ranking
        .iter()
        .take(visible)
        .enumerate()
        .map(|(i, row)| {
            let style = if row.user_id == me {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let elite = if row.is_elite { "★" } else { " " };
            let score = match game.board {
                Board::Coins => format_coins(row.score),
                Board::Level => format!("Lv.{}", row.score),
            };
            Line::from(Span::styled(
                format!("{:>3}. {elite} {:<20} {score:>12}", i + 1, row.display_name),
                style,
            ))
        })
        .collect();
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No players yet",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let title = match rank_of(&game.ranking, me) {
        Some(rank) => format!(" {}: you are #{rank} ", game.board.title()),
        None => format!(" {} ", game.board.title()),
    };
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );
    f.render_widget(widget, chunks[1]);
}

fn render_wallet(
    game: &TapGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let s = game.session.state();
    let w = &s.wallet;
    let mut cl = ClickableList::new();

    cl.push(Line::from(Span::styled(
        w.address.clone(),
        Style::default().fg(Color::DarkGray),
    )));
    cl.push(Line::from(vec![
        Span::styled(
            format!("{:.4} USDT", w.balance(Currency::Usdt)),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   {:.0} VND", w.balance(Currency::Vnd)),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    cl.push(Line::from(""));

    let action_style = Style::default().fg(Color::Yellow);
    cl.push_clickable(
        Line::from(Span::styled(
            format!(" [R] Recharge {} coins", format_coins(RECHARGE_SMALL_COINS)),
            action_style,
        )),
        RECHARGE_SMALL,
    );
    cl.push_clickable(
        Line::from(Span::styled(
            format!(" [X] Recharge {} coins", format_coins(RECHARGE_LARGE_COINS)),
            action_style,
        )),
        RECHARGE_LARGE,
    );
    cl.push_clickable(
        Line::from(Span::styled(" [V] Move all USDT to VND", action_style)),
        TRANSFER_TO_VND,
    );
    cl.push_clickable(
        Line::from(Span::styled(" [U] Move all VND to USDT", action_style)),
        TRANSFER_TO_USDT,
    );

    if !w.history.is_empty() {
        cl.push(Line::from(""));
        cl.push(Line::from(Span::styled(
            "History",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        for tx in w.history.iter().rev().take(HISTORY_ROWS) {
            cl.push(Line::from(Span::styled(
                format!("  {:<16} {:.4} {}", tx.kind.label(), tx.amount, tx.currency.code()),
                Style::default().fg(Color::White),
            )));
        }
    }

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1, 0, 0);
    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(" Wallet "),
    );
    f.render_widget(widget, area);
}

fn render_log(game: &TapGame, f: &mut Frame, area: Rect) {
    let visible_height = area.height.saturating_sub(2) as usize;

    // Newest first
    let lines: Vec<Line> = game
        .log
        .iter()
        .rev()
        .take(visible_height)
        .map(|entry| Line::from(Span::styled(entry.text.as_str(), log_style(entry.kind))))
        .collect();

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Log "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_status(game: &TapGame, f: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let line = match game.log.last() {
        Some(entry) => Line::from(Span::styled(entry.text.as_str(), log_style(entry.kind))),
        None => Line::from(""),
    };
    f.render_widget(Paragraph::new(line), area);
}
