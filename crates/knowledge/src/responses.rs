//! Fixed replies the assistant sends without consulting a language model.

pub const OUT_OF_SCOPE: &str = "I can only answer questions related to Gwanda State University (GSU), such as admissions, programmes, fees, academic calendar, library services, and ICT support.";

pub const SHONA_GREETING: &str = "Mauya kuGSU SmartAssist. Bvunzai chero mubvunzo une chekuita neGwanda State University, sekupinda chikoro, mapurogiramu, mari, raibhurari, kana ICT support.";

pub const ENGLISH_GREETING: &str = "Welcome to GSU SmartAssist. Ask me about admissions, programmes, fees, academic calendar, library services, and ICT support.";

/// No completion provider has an API key.
pub const NOT_CONFIGURED: &str = "I'm sorry, I couldn't find an answer to that in our knowledge base. Please contact GSU ICTS for more assistance.";

/// Every configured provider failed.
pub const PROVIDER_FAILURE: &str = "I'm technically unable to answer that at the moment. Please refer to our FAQs or contact support.";

/// A provider answered with no usable content.
pub const EMPTY_COMPLETION: &str = "I'm sorry, I'm having trouble processing that right now. Please try again or contact ICTS.";
