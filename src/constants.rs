pub const APP_NAME: &str = "KOGNIA";

pub const MAX_FILE_SIZE_MB: u64 = 10;
pub const MAX_FILE_SIZE_BYTES: u64 = MAX_FILE_SIZE_MB * 1024 * 1024;
pub const ALLOWED_TYPES: [&str; 2] = ["application/pdf", "text/plain"];
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["pdf", "txt"];

/// Prior turns kept in an outbound request, after filtering.
pub const HISTORY_LIMIT: usize = 12;
pub const MAX_CITATIONS: usize = 5;

pub const CONNECTION_ERROR_TEXT: &str =
    "Error de conexión con Kognia AI. Por favor verifica tu conexión a internet.";
pub const EMPTY_RESPONSE_TEXT: &str = "No pude generar una respuesta.";

pub const GREETING: &str = "Hola, soy Kognia AI. Sube documentación para que pueda \
razonar sobre ella, o hazme preguntas sobre nuestras soluciones.";

pub const SUGGESTED_PROMPTS: [&str; 4] = [
    "¿Qué soluciones ofrece Kognia?",
    "Explícame el modelo Agent as a Service",
    "Analizar los riesgos de este contrato",
    "Resumir los puntos clave del documento",
];
