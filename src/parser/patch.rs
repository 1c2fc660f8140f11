//! Extraction of inline patches from message bodies.

use regex::Regex;

use super::unix_newlines;

/// `--` (any trailing blanks) followed by a version-control version line,
/// the signature `git format-patch` appends to every patch mail.
const CLOSING: &str = r"^--[ \t]*\n[ \t]*\d[\w.+\-]*[ \t]*$";

/// Ordered boundary templates for patch blocks.
///
/// The first template producing at least one match wins; matches from
/// different templates are never merged. Truncated patches (no closing
/// signature) are never extracted.
#[derive(Debug, Clone)]
pub struct PatchExtractor {
    templates: Vec<Regex>,
}

impl Default for PatchExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PatchExtractor {
    pub fn new() -> Self {
        let templates = [
            // `---`, diffstat, `diff --git` hunks, closing signature
            format!(r"(?ms)^---[ \t]*$.*?^diff --git .*?{CLOSING}"),
            // bare `diff --git` without a diffstat preamble
            format!(r"(?ms)^diff --git .*?{CLOSING}"),
            // plain unified diff: `---` preamble, `+++` file header, `@@` hunk
            format!(r"(?ms)^---[ \t]*$.*?^\+\+\+ .*?^@@ .*?{CLOSING}"),
        ];

        Self {
            templates: templates
                .iter()
                .map(|t| Regex::new(t).expect("valid patch template"))
                .collect(),
        }
    }

    /// Every patch block in order of appearance, trimmed.
    pub fn extract(&self, body: &str) -> Vec<String> {
        let body = unix_newlines(body);
        for template in &self.templates {
            let patches: Vec<String> = template
                .find_iter(&body)
                .map(|m| m.as_str().trim().to_string())
                .collect();
            if !patches.is_empty() {
                return patches;
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATCH: &str = "---\n\
 drivers/iommu/intel-iommu.c | 1 +\n\
 1 file changed, 1 insertion(+)\n\
\n\
diff --git a/drivers/iommu/intel-iommu.c b/drivers/iommu/intel-iommu.c\n\
index 73afed4..bde8f22 100644\n\
--- a/drivers/iommu/intel-iommu.c\n\
+++ b/drivers/iommu/intel-iommu.c\n\
@@ -348,6 +348,7 @@ static inline int first_pte_in_page(struct dma_pte *pte)\n\
+\n\
 #endif /* CONFIG_CRASH_DUMP */\n\
-- \n\
2.0.0-rc0";

    #[test]
    fn test_single_patch() {
        let body = format!("Some context.\n\nSigned-off-by: Bill <bill@example.com>\n{PATCH}\n\n");
        assert_eq!(PatchExtractor::new().extract(&body), vec![PATCH.to_string()]);
    }

    #[test]
    fn test_closing_without_space_or_with_many() {
        let extractor = PatchExtractor::new();
        for closing in ["--\n", "--              \n"] {
            let patch = PATCH.replace("-- \n", closing);
            let body = format!("intro\n{patch}\n");
            assert_eq!(extractor.extract(&body), vec![patch]);
        }
    }

    #[test]
    fn test_two_patches_separated_by_prose() {
        let second = PATCH.replace("intel-iommu", "dmar");
        let body = format!("first one\n{PATCH}\n\n\nThis is the second patch.\n{second}\n");
        let patches = PatchExtractor::new().extract(&body);
        assert_eq!(patches, vec![PATCH.to_string(), second]);
    }

    #[test]
    fn test_truncated_patch_is_dropped() {
        let body = "---\n foo.c | 1 +\n\ndiff --git a/foo.c b/foo.c\n+new line\n";
        assert!(PatchExtractor::new().extract(body).is_empty());
    }

    #[test]
    fn test_bare_diff_template() {
        let patch = "diff --git a/x b/x\n--- a/x\n+++ b/x\n@@ -1 +1 @@\n-a\n+b\n-- \n2.30.0";
        let body = format!("Quick fix below.\n\n{patch}\n");
        assert_eq!(PatchExtractor::new().extract(&body), vec![patch.to_string()]);
    }

    #[test]
    fn test_plain_unified_diff_template() {
        let patch = "---\n--- x.c.orig\n+++ x.c\n@@ -1 +1 @@\n-a\n+b\n--\n1.7.1";
        let body = format!("Old-style patch.\n{patch}\n");
        assert_eq!(PatchExtractor::new().extract(&body), vec![patch.to_string()]);
    }

    #[test]
    fn test_no_patch_in_prose() {
        let body = "syzbot has found a reproducer for the following crash on:\n\n\
                    HEAD commit:    79c3ba32 Merge tag 'drm-fixes-2019-06-07-1'\n\
                    git tree:       upstream\n";
        assert!(PatchExtractor::new().extract(body).is_empty());
    }
}
