//! `appify extract`: show the user code inside a generated app file.

use std::path::Path;

use anyhow::{Context, Result};

use appify_materializer::extract;

pub async fn run(path: &Path) -> Result<()> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    println!("{}", extract_or_notice(&contents));
    Ok(())
}

fn extract_or_notice(contents: &str) -> String {
    extract(contents).unwrap_or_else(|| "# No code".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use appify_materializer::{indent, render};

    #[test]
    fn prints_dedented_code() {
        let file = render(&indent("st.title('x')\nst.write(1)"));
        assert_eq!(extract_or_notice(&file), "st.title('x')\nst.write(1)");
    }

    #[test]
    fn empty_block_is_reported() {
        assert_eq!(extract_or_notice(&render("None")), "# No code");
    }
}
