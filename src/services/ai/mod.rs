pub mod gemini;

use async_trait::async_trait;

/// Persona handed to the provider for every assistant request. Prices and
/// location match the shop's published catalog.
pub const STYLE_ASSISTANT_INSTRUCTION: &str = "Você é o assistente virtual da Man's Space - Barber Street. Seja educado, use um tom profissional e moderno (estilo barbearia premium). Ajude os clientes a escolherem cortes (degradê, social, freestyle) e barbas baseando-se no que eles descrevem. Se perguntarem sobre preços ou horários, cite que temos Corte por R$40 e Barba por R$40. Localização: Vale do Jatobá, BH.";

/// Canned reply when the provider is unreachable or answers garbage. The
/// assistant never surfaces provider errors to the customer.
pub const FALLBACK_REPLY: &str =
    "Desculpe, tive um pequeno problema técnico. Como posso ajudar com seu agendamento hoje?";

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn reply(&self, system_instruction: &str, message: &str) -> anyhow::Result<String>;
}
