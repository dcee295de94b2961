use std::time::Duration;

use call_core::{
    script::format_rupees,
    view::{status_badge, status_label, StatusTone, DISPLAYED_STATUSES},
    ScriptLocale,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{
    domain::{Order, OrderId, OrderStatus},
    protocol::{LineKind, SessionCommand, SessionPhase},
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::UiEvent, orchestration::dispatch_backend_command, reducer::ViewModel,
};
use crate::ui::theme::{badge_color, icon_glyph, tone_color, BRAND_BLUE, PANEL_FILL};

const ANSWER_ROW_HEIGHT: f32 = 56.0;

pub struct CallAgentApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    model: ViewModel,
}

impl CallAgentApp {
    pub fn bootstrap(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            model: ViewModel::default(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.model.apply(event);
        }
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.model.status);
    }

    fn show_header(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("app_header")
            .frame(egui::Frame::new().fill(BRAND_BLUE).inner_margin(egui::Margin::same(12)))
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new("Flipkart Order Confirmation Agent")
                        .heading()
                        .strong()
                        .color(egui::Color32::WHITE),
                );
                ui.label(
                    egui::RichText::new("Simulated customer call system")
                        .small()
                        .color(egui::Color32::from_rgb(219, 234, 254)),
                );
            });
    }

    fn show_stats(&self, ctx: &egui::Context) {
        let counts = self.model.counts();
        let locale = self.model.locale;
        egui::TopBottomPanel::bottom("stats_row")
            .frame(egui::Frame::new().fill(PANEL_FILL).inner_margin(egui::Margin::symmetric(10, 8)))
            .show(ctx, |ui| {
                ui.columns(DISPLAYED_STATUSES.len(), |columns| {
                    for (column, status) in columns.iter_mut().zip(DISPLAYED_STATUSES) {
                        column.vertical_centered(|ui| {
                            ui.label(
                                egui::RichText::new(counts.get(status).to_string())
                                    .size(26.0)
                                    .strong()
                                    .color(tone_color(status_badge(status).tone)),
                            );
                            ui.label(status_label(status, locale));
                        });
                    }
                });
                ui.separator();
                let status = egui::RichText::new(&self.model.status).small();
                let status = match &self.model.error {
                    Some(err) if err.is_fatal() => status.strong().color(tone_color(StatusTone::Failure)),
                    Some(_) => status.color(tone_color(StatusTone::Waiting)),
                    None => status,
                };
                ui.label(status);
            });
    }

    fn show_orders_panel(&mut self, ctx: &egui::Context) {
        let time = ctx.input(|i| i.time);
        let locale = self.model.locale;
        let mut start_call: Option<OrderId> = None;
        let mut refresh = false;

        egui::SidePanel::left("orders_panel")
            .resizable(true)
            .default_width(460.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Orders");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        refresh = ui.small_button("⟳ Refresh").clicked();
                    });
                });
                ui.add_space(6.0);
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for order in self.model.orders() {
                        let can_call = self.model.can_start_call(order);
                        if order_card(ui, order, locale, time, can_call, self.model.call_active())
                        {
                            start_call = Some(order.order_id.clone());
                        }
                        ui.add_space(8.0);
                    }
                });
            });

        if let Some(order_id) = start_call {
            self.dispatch(SessionCommand::StartCall { order_id }.into());
        } else if refresh {
            self.dispatch(BackendCommand::Refresh);
        }
    }

    fn show_call_panel(&mut self, ctx: &egui::Context) {
        let mut command: Option<SessionCommand> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Call interface");
            ui.add_space(6.0);

            let Some(order) = self.model.active_order().filter(|_| self.model.call_active()) else {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new(
                            "No active call\nPress \"Call\" on a pending order to start one",
                        )
                        .color(egui::Color32::GRAY),
                    );
                });
                return;
            };

            egui::Frame::new()
                .fill(BRAND_BLUE)
                .corner_radius(egui::CornerRadius::same(8))
                .inner_margin(egui::Margin::same(12))
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new(&order.customer_name)
                            .size(20.0)
                            .strong()
                            .color(egui::Color32::WHITE),
                    );
                    ui.label(egui::RichText::new(&order.phone_number).color(egui::Color32::WHITE));
                    ui.label(
                        egui::RichText::new(format!("Order: {}", order.order_id))
                            .color(egui::Color32::WHITE),
                    );
                    ui.label(
                        egui::RichText::new(format_rupees(order.total_amount))
                            .strong()
                            .color(egui::Color32::WHITE),
                    );
                });
            ui.add_space(8.0);

            let (lines, phase) = self
                .model
                .snapshot
                .as_ref()
                .map(|s| (s.session.script_lines.as_slice(), s.session.phase))
                .unwrap_or_default();

            egui::ScrollArea::vertical()
                .max_height(transcript_height(ui.available_height()))
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in lines {
                        let text = egui::RichText::new(&line.text);
                        let text = match line.kind {
                            LineKind::Agent => text,
                            LineKind::Closing => text.strong(),
                        };
                        egui::Frame::group(ui.style()).show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            ui.label(text);
                        });
                    }
                });

            let answering = phase == SessionPhase::InCall;
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let confirm = egui::Button::new(
                    egui::RichText::new("✔ Confirm").color(egui::Color32::WHITE),
                )
                .fill(tone_color(StatusTone::Success));
                if ui.add_enabled(answering, confirm).clicked() {
                    command = Some(SessionCommand::ConfirmOrder);
                }
                let cancel = egui::Button::new(
                    egui::RichText::new("✖ Cancel").color(egui::Color32::WHITE),
                )
                .fill(tone_color(StatusTone::Failure));
                if ui.add_enabled(answering, cancel).clicked() {
                    command = Some(SessionCommand::CancelOrder);
                }
            });
        });

        if let Some(command) = command {
            self.dispatch(command.into());
        }
    }
}

/// Room left for the transcript once the answer buttons are laid out.
fn transcript_height(available: f32) -> f32 {
    (available - ANSWER_ROW_HEIGHT).max(0.0)
}

/// Draws one order; returns whether its call button was pressed.
fn order_card(
    ui: &mut egui::Ui,
    order: &Order,
    locale: ScriptLocale,
    time: f64,
    can_call: bool,
    call_active: bool,
) -> bool {
    let mut clicked = false;
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(egui::RichText::new(&order.customer_name).strong().size(16.0));
                ui.small(order.order_id.as_str());
                ui.small(&order.phone_number);
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                let badge = status_badge(order.status);
                let color = badge_color(badge, time);
                ui.label(egui::RichText::new(status_label(order.status, locale)).strong());
                ui.label(egui::RichText::new(icon_glyph(badge.icon)).color(color));
            });
        });
        for item in &order.items {
            ui.label(format!("• {item}"));
        }
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(format_rupees(order.total_amount))
                    .strong()
                    .color(tone_color(StatusTone::Success)),
            );
            if order.status == OrderStatus::Pending {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let button = ui.add_enabled(can_call, egui::Button::new("📞 Call"));
                    let button = if call_active {
                        button.on_disabled_hover_text("Another call is in progress")
                    } else {
                        button
                    };
                    clicked = button.clicked();
                });
            }
        });
    });
    clicked
}

impl eframe::App for CallAgentApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_header(ctx);
        self.show_stats(ctx);
        self.show_orders_panel(ctx);
        self.show_call_panel(ctx);

        if self.model.call_active() {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl Drop for CallAgentApp {
    fn drop(&mut self) {
        let _ = self.cmd_tx.try_send(BackendCommand::Shutdown);
    }
}
