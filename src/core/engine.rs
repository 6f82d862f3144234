use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct PipelineEngine<P: Pipeline> {
    name: String,
    pipeline: P,
}

impl<P: Pipeline> PipelineEngine<P> {
    pub fn new(name: impl Into<String>, pipeline: P) -> Self {
        Self {
            name: name.into(),
            pipeline,
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<P::Output> {
        let started = Instant::now();
        tracing::debug!("🚀 Starting {}", self.name);

        tracing::debug!("📥 Extract phase");
        let extracted = self.pipeline.extract().await?;

        tracing::debug!("🔄 Transform phase");
        let transformed = self.pipeline.transform(extracted).await?;

        tracing::debug!("💾 Load phase");
        let output = self.pipeline.load(transformed).await?;

        tracing::debug!("✅ {} finished in {:?}", self.name, started.elapsed());
        Ok(output)
    }
}
