//! Prompt and persona templates for grounded analysis
//!
//! Both the company name and the user's question are embedded verbatim. They
//! are not sanitized against prompt injection.

use crate::language::Language;
use minijinja::{Environment, context};

const PROMPT_EN: &str = r#"Carry out a financial analysis of the company "{{ stock_name }}". Focus on the latest news, market sentiment and important events that could affect the share price. Base your analysis ONLY on the results from Google Search. Structure your answer in Markdown with headings for readability. Start with a short summary. End the analysis with a disclaimer stating that this is not financial advice. User question to consider: "{{ user_query }}""#;

const PROMPT_NO: &str = r#"Gjennomfør en finansiell analyse for selskapet "{{ stock_name }}". Fokuser på de siste nyhetene, markedssentiment, og viktige hendelser som kan påvirke aksjekursen. Baser analysen din KUN på resultatene fra Google Search. Strukturer svaret ditt i Markdown-format med overskrifter for lesbarhet. Start med et kort sammendrag. Avslutt analysen med en ansvarsfraskrivelse om at dette ikke er finansiell rådgivning. Brukerspørsmål å vurdere: "{{ user_query }}""#;

const PERSONA_EN: &str = "You are a neutral financial analyst assistant who gives data-driven summaries based on real-time search results. You avoid speculation and never give direct buy or sell recommendations.";

const PERSONA_NO: &str = "Du er en nøytral finansiell analytiker-assistent som gir datadrevne sammendrag basert på sanntids søkeresultater. Du unngår spekulasjon og gir aldri direkte kjøps- eller salgsanbefalinger.";

/// Rendered prompt templates for one language
#[derive(Debug)]
pub struct PromptSet {
    language: Language,
    env: Environment<'static>,
    persona: String,
}

impl PromptSet {
    /// Load the templates for `language`
    ///
    /// The persona takes no inputs, so it is rendered once here.
    pub fn new(language: Language) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        let (analysis, persona) = match language {
            Language::English => (PROMPT_EN, PERSONA_EN),
            Language::Norwegian => (PROMPT_NO, PERSONA_NO),
        };
        env.add_template("analysis", analysis)?;
        env.add_template("persona", persona)?;

        let persona = env
            .get_template("persona")?
            .render(context! {})?;

        Ok(Self {
            language,
            env,
            persona,
        })
    }

    /// Language the templates are written in
    pub fn language(&self) -> Language {
        self.language
    }

    /// Render the user prompt for one request
    pub fn render(&self, stock_name: &str, user_query: &str) -> Result<String, minijinja::Error> {
        self.env
            .get_template("analysis")?
            .render(context! { stock_name, user_query })
    }

    /// System persona sent alongside every prompt
    pub fn persona(&self) -> &str {
        &self.persona
    }
}
