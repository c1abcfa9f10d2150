pub mod llm;
pub mod ollama;

#[cfg(test)]
pub mod test_provider;
