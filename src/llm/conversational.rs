//! Rule-based conversational reply generator.
//!
//! This is the terminal strategy of the orchestrator: total, no I/O,
//! never fails. Stage one recognizes a fixed set of intents; stage two
//! elaborates on the detected topic for advice/alternatives requests
//! and for distressed generic text. When several hand-authored variants
//! fit equally well, one is chosen through an injectable picker so the
//! selection can be made deterministic in tests.

use async_trait::async_trait;
use rand::Rng;

use super::{GenerationResult, ProviderError, ReplyStrategy};
use crate::sentiment::{self, tokenize};
use crate::shared::models::Sentiment;

/// Selection among equally valid reply variants. Never affects
/// classification or persistence, only which text the user reads.
pub trait VariantPicker: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Default picker backed by the thread RNG.
pub struct RandomPicker;

impl VariantPicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Picker that always selects the first variant. Used by tests and
/// anywhere reproducible output matters.
pub struct FirstPicker;

impl VariantPicker for FirstPicker {
    fn pick(&self, _len: usize) -> usize {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Greeting,
    Capabilities,
    AdviceRequest,
    AlternativesRequest,
    Thanks,
    Farewell,
    GenericQuestion,
    ShortUtterance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    MixedDistress,
    RelationshipConflict,
    FamilySeparation,
    Anxiety,
    GenericNegative,
}

// ── Reply variant tables ────────────────────────────────────────────────

const GREETING_REPLIES: &[&str] = &[
    "¡Hola! Me alegra que estés aquí. ¿Cómo te sientes hoy?",
    "¡Hola! Estoy aquí para escucharte. Cuéntame, ¿qué tal va tu día?",
    "¡Hola! ¿Cómo estás? Puedes contarme lo que quieras, estoy para ayudarte.",
];

const CAPABILITIES_REPLIES: &[&str] = &[
    "Puedo escucharte, ayudarte a poner en palabras lo que sientes y ofrecerte \
     consejos prácticos o alternativas cuando enfrentas un problema. Cuéntame qué \
     te preocupa y lo vemos juntos.",
    "Estoy aquí para acompañarte: puedo conversar contigo, analizar cómo te \
     sientes y sugerirte pasos concretos cuando algo te agobia. ¿Por dónde \
     quieres empezar?",
];

const THANKS_REPLIES: &[&str] = &[
    "¡De nada! Me alegra haberte ayudado. Aquí estaré cuando me necesites.",
    "No hay de qué. Cuídate mucho, y vuelve cuando quieras conversar.",
    "Con gusto. Recuerda que no estás solo en esto.",
];

const FAREWELL_REPLIES: &[&str] = &[
    "¡Hasta pronto! Cuídate mucho y recuerda que aquí estaré si necesitas hablar.",
    "Adiós, que tengas un buen día. Vuelve cuando quieras.",
];

const GENERIC_QUESTION_REPLIES: &[&str] = &[
    "Es una buena pregunta. Cuéntame un poco más de contexto para poder darte \
     una respuesta que de verdad te sirva.",
    "Me gustaría entender mejor tu situación antes de responder. ¿Puedes darme \
     más detalles?",
];

const SHORT_UTTERANCE_REPLIES: &[&str] = &[
    "Cuéntame un poco más, te escucho.",
    "Estoy aquí. ¿Qué tienes en mente?",
    "Te leo. ¿Quieres contarme más sobre eso?",
];

const POSITIVE_REPLIES: &[&str] = &[
    "¡Qué alegría leer eso! Disfruta el momento, te lo mereces. ¿Qué fue lo \
     mejor de tu día?",
    "Me encanta que te sientas así. Celebrar las cosas buenas también es \
     cuidarse. ¡Cuéntame más!",
];

const NEUTRAL_REPLIES: &[&str] = &[
    "Gracias por compartirlo. Si quieres profundizar en algo, aquí estoy para \
     escucharte.",
    "Entiendo. ¿Hay algo en particular de lo que te gustaría hablar hoy?",
];

const MIXED_DISTRESS_REPLIES: &[&str] = &[
    "Sentir frustración y tristeza al mismo tiempo, sin saber qué decidir, es \
     agotador. Te propongo algo: escribe las opciones que tienes, aunque parezcan \
     malas, y al lado lo que ganas y pierdes con cada una. Verlo fuera de tu \
     cabeza suele aclarar bastante. Y no tienes que decidirlo todo hoy.",
    "Cuando la frustración y la tristeza se mezclan con la indecisión, ayuda \
     separar los hilos: ¿qué parte depende de ti y qué parte no? Empieza por un \
     paso pequeño sobre lo que sí controlas, y date permiso para sentir el resto \
     sin exigirte resolverlo ya.",
];

const RELATIONSHIP_CONFLICT_REPLIES: &[&str] = &[
    "Los conflictos de pareja duelen mucho. Algunas cosas que suelen ayudar: \
     busca un momento tranquilo para hablar sin interrupciones, usa frases en \
     primera persona (\"yo me siento...\") en lugar de reproches, y escucha su \
     versión completa antes de responder. Si la conversación se calienta, \
     propongan una pausa y retomen después.",
    "Lamento que estés pasando por un conflicto así. Te sugiero tres caminos: \
     hablar cuando ambos estén calmados y no en plena discusión, escribir antes \
     lo que quieres decir para no perderte en el enojo, o buscar apoyo de un \
     tercero neutral como un consejero de pareja. Ninguna opción es rendirse; \
     todas son formas de cuidar la relación.",
];

const FAMILY_SEPARATION_REPLIES: &[&str] = &[
    "Estar lejos de la familia, o atravesar una separación, pesa más de lo que \
     solemos admitir. Algunas alternativas: acuerda llamadas fijas con las \
     personas que extrañas para que el contacto no dependa del azar, arma una \
     rutina propia que te dé estabilidad, y apóyate en alguien cercano a quien \
     puedas contarle cómo te sientes.",
    "Los cambios familiares duelen porque tocan nuestra base. Date tiempo para \
     adaptarte: mantén el contacto con quienes quieres aunque sea breve y \
     frecuente, conserva rituales que te conecten con ellos, y no te aísles de \
     las personas que tienes cerca ahora.",
];

const ANXIETY_REPLIES: &[&str] = &[
    "La ansiedad se siente enorme, pero hay maneras de bajarle el volumen: \
     respira profundo contando cuatro segundos al inhalar y seis al exhalar, \
     pon por escrito lo que te preocupa para sacarlo de la cabeza, y mueve el \
     cuerpo aunque sea con una caminata corta. Si se repite muy seguido, hablar \
     con un profesional ayuda muchísimo.",
    "Entiendo esa sensación de nervios constantes. Prueba esto: identifica qué \
     es lo peor que temes que pase y qué tan probable es de verdad; muchas veces \
     la ansiedad exagera. Mientras tanto, cuida lo básico: dormir, comer bien y \
     pausas sin pantallas.",
];

const GENERIC_NEGATIVE_REPLIES: &[&str] = &[
    "Lamento mucho que estés pasando por esto. Lo que sientes es válido y no \
     tienes que cargarlo en silencio. ¿Quieres contarme qué fue lo que más te \
     afectó? A veces ponerlo en palabras ya alivia un poco.",
    "Siento que estés así. Recuerda que está bien no estar bien. Un primer paso \
     puede ser algo pequeño y amable contigo: descansar, salir a caminar o \
     hablar con alguien de confianza. Y si el malestar persiste, buscar apoyo \
     profesional es un acto de valentía, no de debilidad.",
    "Gracias por confiarme algo tan difícil. No estás solo en esto. Cuéntame un \
     poco más: ¿desde cuándo te sientes así y qué crees que lo detonó?",
];

// ── Generator ───────────────────────────────────────────────────────────

pub struct ConversationalGenerator {
    picker: Box<dyn VariantPicker>,
}

impl Default for ConversationalGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationalGenerator {
    pub fn new() -> Self {
        Self {
            picker: Box::new(RandomPicker),
        }
    }

    pub fn with_picker(picker: Box<dyn VariantPicker>) -> Self {
        Self { picker }
    }

    /// Produce a reply for any input. Total: the empty string, a lone
    /// emoji and arbitrarily long text all get a non-empty answer.
    pub fn generate(&self, text: &str) -> GenerationResult {
        let classification = sentiment::classify(text);
        let normalized = text.trim().to_lowercase();
        let tokens = tokenize(text);

        let reply = match detect_intent(&normalized, &tokens) {
            Some(Intent::Greeting) => self.choose(GREETING_REPLIES),
            Some(Intent::Capabilities) => self.choose(CAPABILITIES_REPLIES),
            Some(Intent::AdviceRequest) | Some(Intent::AlternativesRequest) => {
                self.elaborate(&normalized)
            }
            Some(Intent::Thanks) => self.choose(THANKS_REPLIES),
            Some(Intent::Farewell) => self.choose(FAREWELL_REPLIES),
            Some(Intent::GenericQuestion) => self.choose(GENERIC_QUESTION_REPLIES),
            Some(Intent::ShortUtterance) => self.choose(SHORT_UTTERANCE_REPLIES),
            None => match classification.sentiment {
                Sentiment::Negative => self.elaborate(&normalized),
                Sentiment::Positive => self.choose(POSITIVE_REPLIES),
                Sentiment::Neutral | Sentiment::Unknown => self.choose(NEUTRAL_REPLIES),
            },
        };

        GenerationResult {
            classification,
            reply_text: reply,
            strategy: "conversational",
        }
    }

    fn choose(&self, variants: &[&str]) -> String {
        variants[self.picker.pick(variants.len())].to_string()
    }

    /// Stage two: pick the reply family for the dominant topic.
    fn elaborate(&self, normalized: &str) -> String {
        match detect_topic(normalized) {
            Topic::MixedDistress => self.choose(MIXED_DISTRESS_REPLIES),
            Topic::RelationshipConflict => self.choose(RELATIONSHIP_CONFLICT_REPLIES),
            Topic::FamilySeparation => self.choose(FAMILY_SEPARATION_REPLIES),
            Topic::Anxiety => self.choose(ANXIETY_REPLIES),
            Topic::GenericNegative => self.choose(GENERIC_NEGATIVE_REPLIES),
        }
    }
}

#[async_trait]
impl ReplyStrategy for ConversationalGenerator {
    fn name(&self) -> &'static str {
        "conversational"
    }

    async fn produce_reply(&self, text: &str) -> Result<GenerationResult, ProviderError> {
        Ok(self.generate(text))
    }
}

// ── Intent and topic detection ──────────────────────────────────────────

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn has_token(tokens: &[String], words: &[&str]) -> bool {
    tokens.iter().any(|t| words.contains(&t.as_str()))
}

/// First matching intent wins; evaluation order is fixed.
fn detect_intent(normalized: &str, tokens: &[String]) -> Option<Intent> {
    if has_token(tokens, &["hola", "buenas", "hello", "hi", "hey"])
        || contains_any(normalized, &["cómo estás", "como estas", "how are you"])
    {
        return Some(Intent::Greeting);
    }
    if contains_any(
        normalized,
        &[
            "qué puedes hacer",
            "que puedes hacer",
            "what can you do",
            "en qué me puedes ayudar",
            "en que me puedes ayudar",
            "para qué sirves",
            "para que sirves",
        ],
    ) {
        return Some(Intent::Capabilities);
    }
    if has_token(tokens, &["consejo", "consejos", "advice"])
        || contains_any(
            normalized,
            &["aconséjame", "aconsejame", "qué me aconsejas", "que me aconsejas"],
        )
    {
        return Some(Intent::AdviceRequest);
    }
    if has_token(tokens, &["alternativa", "alternativas", "opciones", "alternatives", "options"])
        || contains_any(
            normalized,
            &["qué hago", "que hago", "qué puedo hacer", "que puedo hacer"],
        )
    {
        return Some(Intent::AlternativesRequest);
    }
    if has_token(tokens, &["gracias", "thanks"]) || normalized.contains("thank you") {
        return Some(Intent::Thanks);
    }
    if has_token(tokens, &["adiós", "adios", "chao", "bye", "goodbye"])
        || contains_any(normalized, &["hasta luego", "hasta pronto", "nos vemos"])
    {
        return Some(Intent::Farewell);
    }
    if normalized.contains('?') || normalized.contains('¿') {
        return Some(Intent::GenericQuestion);
    }
    if tokens.len() <= 2 {
        return Some(Intent::ShortUtterance);
    }
    None
}

/// Most specific topic first; generic support is the floor.
fn detect_topic(normalized: &str) -> Topic {
    let frustrated = contains_any(normalized, &["frustrado", "frustrada", "frustración", "frustracion", "frustrated"]);
    let sad = contains_any(normalized, &["triste", "tristeza", "sad"]);
    let undecided = contains_any(
        normalized,
        &["no sé", "no se", "indeciso", "indecisa", "decidir", "decisión", "decision"],
    );
    if frustrated && sad && undecided {
        return Topic::MixedDistress;
    }

    if contains_any(
        normalized,
        &[
            "pareja", "novio", "novia", "esposo", "esposa", "pelea", "peleamos",
            "discusión", "discusion", "relación", "relacion", "conflicto",
        ],
    ) {
        return Topic::RelationshipConflict;
    }

    if contains_any(
        normalized,
        &[
            "familia", "padres", "divorcio", "separación", "separacion",
            "lejos de casa", "extraño a", "extrano a",
        ],
    ) {
        return Topic::FamilySeparation;
    }

    if contains_any(
        normalized,
        &["ansioso", "ansiosa", "ansiedad", "nervios", "estrés", "estres", "anxious", "anxiety"],
    ) {
        return Topic::Anxiety;
    }

    Topic::GenericNegative
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::UrgencyTier;

    fn deterministic() -> ConversationalGenerator {
        ConversationalGenerator::with_picker(Box::new(FirstPicker))
    }

    #[test]
    fn total_over_degenerate_inputs() {
        let generator = ConversationalGenerator::new();
        let long = "a".repeat(10_000);
        for input in ["", "🙂", long.as_str()] {
            let result = generator.generate(input);
            assert!(
                !result.reply_text.is_empty(),
                "no reply for input of {} chars",
                input.len()
            );
        }
    }

    #[test]
    fn greeting_intent_picks_from_greeting_set() {
        let generator = ConversationalGenerator::new();
        let result = generator.generate("hola, ¿cómo estás?");
        assert!(GREETING_REPLIES.contains(&result.reply_text.as_str()));
    }

    #[test]
    fn capabilities_intent_is_recognized() {
        let result = deterministic().generate("¿qué puedes hacer?");
        assert!(CAPABILITIES_REPLIES.contains(&result.reply_text.as_str()));
    }

    #[test]
    fn thanks_and_farewell_intents() {
        let generator = ConversationalGenerator::new();
        let thanks = generator.generate("muchas gracias por todo");
        assert!(THANKS_REPLIES.contains(&thanks.reply_text.as_str()));
        let farewell = generator.generate("adiós, hasta luego");
        assert!(FAREWELL_REPLIES.contains(&farewell.reply_text.as_str()));
    }

    #[test]
    fn short_utterance_gets_a_prompt_to_continue() {
        let result = ConversationalGenerator::new().generate("estoy cansado");
        // Two tokens, no other intent.
        assert!(SHORT_UTTERANCE_REPLIES.contains(&result.reply_text.as_str()));
    }

    #[test]
    fn advice_request_about_relationship_elaborates_on_topic() {
        let generator = ConversationalGenerator::new();
        let result = generator.generate("dame un consejo, tuve una pelea con mi pareja");
        assert!(RELATIONSHIP_CONFLICT_REPLIES.contains(&result.reply_text.as_str()));
    }

    #[test]
    fn alternatives_request_about_anxiety_elaborates_on_topic() {
        let result = ConversationalGenerator::new()
            .generate("no sé qué hago con tanta ansiedad últimamente, necesito opciones");
        assert!(ANXIETY_REPLIES.contains(&result.reply_text.as_str()));
    }

    #[test]
    fn combined_distress_takes_precedence() {
        let result = ConversationalGenerator::new()
            .generate("me siento frustrado y triste, no sé qué decidir sobre mi trabajo");
        assert!(MIXED_DISTRESS_REPLIES.contains(&result.reply_text.as_str()));
    }

    #[test]
    fn negative_text_without_intent_gets_support() {
        let result = ConversationalGenerator::new().generate("me siento muy triste desde hace varios días");
        assert!(GENERIC_NEGATIVE_REPLIES.contains(&result.reply_text.as_str()));
    }

    #[test]
    fn positive_text_gets_celebration() {
        let result = ConversationalGenerator::new().generate("hoy me siento muy feliz con mi vida");
        assert!(POSITIVE_REPLIES.contains(&result.reply_text.as_str()));
    }

    #[test]
    fn neutral_text_gets_default_reply() {
        let result = ConversationalGenerator::new().generate("hoy fui al mercado del centro");
        assert!(NEUTRAL_REPLIES.contains(&result.reply_text.as_str()));
    }

    #[test]
    fn picker_choice_never_affects_classification() {
        let first = deterministic().generate("me siento muy triste y frustrado");
        let random = ConversationalGenerator::new().generate("me siento muy triste y frustrado");
        assert_eq!(first.classification, random.classification);
        assert_eq!(first.classification.urgency_tier, UrgencyTier::High);
    }

    #[test]
    fn deterministic_picker_is_reproducible() {
        let generator = deterministic();
        let a = generator.generate("hola");
        let b = generator.generate("hola");
        assert_eq!(a.reply_text, b.reply_text);
    }
}
