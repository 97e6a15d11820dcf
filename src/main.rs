use std::path::PathBuf;

use dotenv::dotenv;
use iced::widget::{
    button, column, container, progress_bar, row, scrollable, text, text_input, Button,
};
use iced::{
    alignment::Horizontal, event, theme, window, Alignment, Application, Background, Color,
    Command, Element, Event, Length, Settings, Subscription, Theme,
};
use log::{error, info};
use uuid::Uuid;

use kognia_chat::client::{generate_reply, ChatReply};
use kognia_chat::config::Config;
use kognia_chat::constants::{APP_NAME, GREETING, MAX_FILE_SIZE_MB, SUGGESTED_PROMPTS};
use kognia_chat::conversation::Conversation;
use kognia_chat::files::{self, FileProbe, FileStore, Submission};
use kognia_chat::models::{FileStatus, Message, Role};

struct KogniaApp {
    config: Config,
    http: reqwest::Client,
    files: FileStore,
    conversation: Conversation,
    input_value: String,
    file_path_input: String,
    view: View,
    status: String,
    scroll_id: scrollable::Id,
}

#[derive(Default, Clone, Copy, Debug, PartialEq)]
enum View {
    #[default]
    Chat,
    Info,
}

#[derive(Clone, Debug)]
enum AppMessage {
    InputChanged(String),
    FilePathChanged(String),
    Send,
    SendSuggested(String),
    ClearChat,
    SwitchView(View),
    AttachFile,
    FileDropped(PathBuf),
    FileProbed(Result<FileProbe, String>),
    ProgressTick(Uuid),
    FileEncoded { id: Uuid, result: Result<String, String> },
    RemoveFile(Uuid),
    ReplyReceived { id: Uuid, reply: ChatReply },
}

const TICK_INTERVAL_MS: u64 = 150;

impl Application for KogniaApp {
    type Executor = iced::executor::Default;
    type Message = AppMessage;
    type Theme = Theme;
    type Flags = ();

    fn new(_flags: ()) -> (Self, Command<AppMessage>) {
        (
            KogniaApp {
                config: Config::from_env(),
                http: reqwest::Client::new(),
                files: FileStore::default(),
                conversation: Conversation::default(),
                input_value: String::new(),
                file_path_input: String::new(),
                view: View::Chat,
                status: String::new(),
                scroll_id: scrollable::Id::new("chat_scroll"),
            },
            Command::none(),
        )
    }

    fn title(&self) -> String {
        String::from("Kognia AI")
    }

    fn update(&mut self, message: AppMessage) -> Command<AppMessage> {
        match message {
            AppMessage::InputChanged(value) => {
                self.input_value = value;
                Command::none()
            }
            AppMessage::FilePathChanged(value) => {
                self.file_path_input = value;
                Command::none()
            }
            AppMessage::Send => {
                let text = self.input_value.clone();
                self.start_send(text)
            }
            AppMessage::SendSuggested(prompt) => self.start_send(prompt),
            AppMessage::ReplyReceived { id, reply } => {
                self.conversation.resolve(id, reply.text, reply.citations);
                self.snap_to_bottom()
            }
            AppMessage::ClearChat => {
                if self.conversation.clear() {
                    self.input_value.clear();
                    self.status.clear();
                } else {
                    self.status = "Espera la respuesta antes de reiniciar".to_string();
                }
                Command::none()
            }
            AppMessage::SwitchView(view) => {
                self.view = view;
                Command::none()
            }
            AppMessage::AttachFile => {
                if self.file_path_input.is_empty() {
                    self.status = "Indica la ruta del archivo".to_string();
                    return Command::none();
                }
                let path = PathBuf::from(normalize_path(&self.file_path_input));
                self.file_path_input.clear();
                Command::perform(
                    async move { files::probe(path).await.map_err(|e| e.to_string()) },
                    AppMessage::FileProbed,
                )
            }
            AppMessage::FileDropped(path) => Command::perform(
                async move { files::probe(path).await.map_err(|e| e.to_string()) },
                AppMessage::FileProbed,
            ),
            AppMessage::FileProbed(Ok(probe)) => {
                match self
                    .files
                    .submit(&probe.name, &probe.declared_type, probe.size)
                {
                    Submission::Skipped => {
                        self.status = format!("{} ya está cargado", probe.name);
                        Command::none()
                    }
                    Submission::Rejected(_) => {
                        self.status = format!(
                            "No se pudo cargar {} (PDF/TXT, máx {}MB)",
                            probe.name, MAX_FILE_SIZE_MB
                        );
                        Command::none()
                    }
                    Submission::Accepted(id) => {
                        info!("Encoding {} ({} bytes)", probe.name, probe.size);
                        self.status.clear();
                        let path = probe.path;
                        Command::batch(vec![
                            Command::perform(
                                async move {
                                    files::read_and_encode(path).await.map_err(|e| e.to_string())
                                },
                                move |result| AppMessage::FileEncoded { id, result },
                            ),
                            schedule_tick(id),
                        ])
                    }
                }
            }
            AppMessage::FileProbed(Err(e)) => {
                error!("Failed to probe file: {}", e);
                self.status = format!("No se pudo leer el archivo: {}", e);
                Command::none()
            }
            AppMessage::ProgressTick(id) => {
                if self.files.tick_progress(id) {
                    schedule_tick(id)
                } else {
                    Command::none()
                }
            }
            AppMessage::FileEncoded { id, result } => {
                match result {
                    Ok(content) => self.files.complete(id, content),
                    Err(e) => {
                        error!("Failed to encode file: {}", e);
                        self.files.fail(id);
                    }
                }
                Command::none()
            }
            AppMessage::RemoveFile(id) => {
                self.files.remove(id);
                Command::none()
            }
        }
    }

    fn view(&self) -> Element<AppMessage> {
        let header = self.view_header();
        let body: Element<AppMessage> = match self.view {
            View::Chat => row![self.view_file_panel(), self.view_chat_panel()]
                .spacing(20)
                .height(Length::Fill)
                .into(),
            View::Info => self.view_info_panel(),
        };
        let status = text(&self.status).size(14);

        container(column![header, body, status].spacing(15).padding(15))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<AppMessage> {
        event::listen_with(|event, _status| match event {
            Event::Window(_, window::Event::FileDropped(path)) => {
                Some(AppMessage::FileDropped(path))
            }
            _ => None,
        })
    }
}

impl KogniaApp {
    fn start_send(&mut self, text: String) -> Command<AppMessage> {
        let Some(placeholder_id) = self.conversation.begin_send(&text) else {
            return Command::none();
        };
        self.input_value.clear();

        let http = self.http.clone();
        let config = self.config.clone();
        let messages = self.conversation.messages().to_vec();
        let files = self.files.files().to_vec();
        let query = text.trim().to_string();
        Command::batch(vec![
            Command::perform(
                async move { generate_reply(&http, &config, &messages, &query, &files).await },
                move |reply| AppMessage::ReplyReceived {
                    id: placeholder_id,
                    reply,
                },
            ),
            self.snap_to_bottom(),
        ])
    }

    fn snap_to_bottom(&self) -> Command<AppMessage> {
        scrollable::snap_to(
            self.scroll_id.clone(),
            scrollable::RelativeOffset { x: 0.0, y: 1.0 },
        )
    }

    fn view_header(&self) -> Element<AppMessage> {
        let chat_button = button("Chat")
            .on_press(AppMessage::SwitchView(View::Chat))
            .padding(8);
        let info_button = button("Info")
            .on_press(AppMessage::SwitchView(View::Info))
            .padding(8);

        let mut header = row![
            text(APP_NAME).size(28),
            row![chat_button, info_button].spacing(10),
        ]
        .spacing(20)
        .align_items(Alignment::Center);

        if !self.conversation.is_empty() {
            header = header.push(button("Reiniciar").on_press(AppMessage::ClearChat).padding(8));
        }
        header.into()
    }

    fn view_file_panel(&self) -> Element<AppMessage> {
        let path_input = text_input("Ruta del archivo (PDF o TXT)", &self.file_path_input)
            .on_input(AppMessage::FilePathChanged)
            .on_submit(AppMessage::AttachFile)
            .padding(10)
            .style(theme::TextInput::Default);
        let attach_button = button("Cargar").on_press(AppMessage::AttachFile).padding(10);

        let mut list = column![].spacing(8);
        if self.files.files().is_empty() {
            list = list.push(text("Sin documentos activos").size(14));
        }
        for file in self.files.files() {
            let label = text(&file.name).size(14);
            let remove = button(text("x").size(12))
                .on_press(AppMessage::RemoveFile(file.id))
                .padding(4);
            let detail: Element<AppMessage> = match file.status {
                FileStatus::Ready => text("Listo").size(12).into(),
                FileStatus::Error => text("Error")
                    .size(12)
                    .style(Color::from_rgb(0.8, 0.1, 0.1))
                    .into(),
                _ => progress_bar(0.0..=100.0, f32::from(file.progress))
                    .height(Length::Fixed(8.0))
                    .into(),
            };
            list = list.push(
                column![
                    row![label, remove].spacing(8).align_items(Alignment::Center),
                    row![text(format_size(file.size)).size(12), detail]
                        .spacing(8)
                        .align_items(Alignment::Center),
                ]
                .spacing(4),
            );
        }

        container(
            column![
                text("Contexto Documental").size(20),
                text(format!(
                    "Sube contratos o documentación (PDF/TXT, máx {}MB). También puedes arrastrarlos aquí.",
                    MAX_FILE_SIZE_MB
                ))
                .size(13),
                row![path_input, attach_button].spacing(8),
                scrollable(list).height(Length::Fill),
            ]
            .spacing(12),
        )
        .width(Length::Fixed(320.0))
        .height(Length::Fill)
        .padding(10)
        .into()
    }

    fn view_chat_panel(&self) -> Element<AppMessage> {
        let ready_count = self.files.ready_count();
        let subtitle = if ready_count > 0 {
            format!("Analizando {} documento(s)", ready_count)
        } else {
            "Modo General".to_string()
        };

        let messages_area: Element<AppMessage> = if self.conversation.is_empty() {
            let mut prompts = column![].spacing(8);
            for prompt in SUGGESTED_PROMPTS {
                prompts = prompts.push(
                    Button::new(text(prompt).size(14))
                        .on_press(AppMessage::SendSuggested(prompt.to_string()))
                        .padding(8)
                        .width(Length::Fill),
                );
            }
            column![text(GREETING).size(15), prompts]
                .spacing(15)
                .padding(10)
                .into()
        } else {
            scrollable(
                column(
                    self.conversation
                        .messages()
                        .iter()
                        .map(view_message)
                        .collect::<Vec<_>>(),
                )
                .spacing(10)
                .padding(10)
                .width(Length::Fill),
            )
            .height(Length::Fill)
            .id(self.scroll_id.clone())
            .into()
        };

        let placeholder = if ready_count > 0 {
            "Pregunta sobre los documentos..."
        } else {
            "Escribe tu consulta a Kognia..."
        };
        let input = text_input(placeholder, &self.input_value)
            .on_input(AppMessage::InputChanged)
            .on_submit(AppMessage::Send)
            .padding(10)
            .style(theme::TextInput::Default);

        let mut send_button = button("Enviar").padding(10);
        if !self.conversation.in_flight() && !self.input_value.trim().is_empty() {
            send_button = send_button.on_press(AppMessage::Send);
        }
        let processing = if self.conversation.in_flight() {
            text("Procesando...").size(12)
        } else {
            text("").size(12)
        };

        container(
            column![
                text(subtitle).size(14),
                messages_area,
                row![input, send_button, processing]
                    .spacing(8)
                    .align_items(Alignment::Center),
            ]
            .spacing(10),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(10)
        .into()
    }

    fn view_info_panel(&self) -> Element<AppMessage> {
        container(
            column![
                text("Kognia").size(24),
                text("Asistente legal inteligente especializado en análisis documental.").size(15),
                text("Sube tus contratos y documentación corporativa; Kognia fundamenta sus respuestas estrictamente en su contenido y cita las cláusulas relevantes.").size(15),
            ]
            .spacing(12)
            .padding(20),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }
}

fn view_message(msg: &Message) -> Element<AppMessage> {
    let is_user = msg.role == Role::User;
    let body: Element<AppMessage> = if msg.is_typing {
        text("Kognia está escribiendo...").size(14).into()
    } else if msg.citations.is_empty() {
        text(&msg.content).size(15).into()
    } else {
        column![
            text(&msg.content).size(15),
            text(format!("Fuentes: {}", msg.citations.join(", ")))
                .size(12)
                .style(Color::from_rgb(0.4, 0.4, 0.4)),
        ]
        .spacing(4)
        .into()
    };

    container(body)
        .padding(10)
        .max_width(500)
        .style(move |_theme: &Theme| container::Appearance {
            background: Some(Background::Color(if is_user {
                Color::from_rgb(0.2, 0.6, 1.0)
            } else {
                Color::from_rgb(0.95, 0.95, 0.95)
            })),
            border: iced::Border {
                color: Color::from_rgb(0.7, 0.7, 0.7),
                width: 1.0,
                radius: 8.0.into(),
            },
            ..Default::default()
        })
        .align_x(if is_user {
            Horizontal::Right
        } else {
            Horizontal::Left
        })
        .into()
}

fn schedule_tick(id: Uuid) -> Command<AppMessage> {
    Command::perform(
        async move { tokio::time::sleep(tokio::time::Duration::from_millis(TICK_INTERVAL_MS)).await },
        move |_| AppMessage::ProgressTick(id),
    )
}

fn normalize_path(path: &str) -> String {
    path.replace("\\\\", "/").replace('\\', "/")
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

fn main() -> iced::Result {
    dotenv().ok();
    env_logger::init();
    KogniaApp::run(Settings::default())
}
