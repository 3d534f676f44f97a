//! Safe-region merging.
//!
//! Regenerated source replaces everything outside the marked regions;
//! the content between markers is carried over from the previous
//! artifact. Regions pair up positionally, so a regeneration that
//! changes the number of regions is a structural mismatch and the
//! merge refuses rather than guessing which edits belong where.

use std::sync::LazyLock;

use regex::Regex;

/// Matches one whole safe region, markers included. Covers the code
/// comment syntax used in script blocks and the markup comment syntax
/// used in template blocks.
static SAFE_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)/\* SAFE REGION BEGIN \*/.*?/\* SAFE REGION END \*/|<!-- SAFE REGION BEGIN -->.*?<!-- SAFE REGION END -->",
    )
    .unwrap()
});

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MergeError {
    #[error(
        "safe region count changed from {old} to {new}; regions pair positionally, manual merge required"
    )]
    StructureMismatch { old: usize, new: usize },
}

/// Splice the safe regions of `old_text` into `new_text`, pairing
/// regions by position.
pub fn replace_safe_regions(new_text: &str, old_text: &str) -> Result<String, MergeError> {
    let old_regions: Vec<&str> = SAFE_REGION
        .find_iter(old_text)
        .map(|m| m.as_str())
        .collect();
    let new_regions: Vec<_> = SAFE_REGION.find_iter(new_text).collect();

    if old_regions.len() != new_regions.len() {
        return Err(MergeError::StructureMismatch {
            old: old_regions.len(),
            new: new_regions.len(),
        });
    }

    let mut merged = String::with_capacity(new_text.len() + old_text.len());
    let mut cursor = 0;
    for (region, old_region) in new_regions.iter().zip(&old_regions) {
        merged.push_str(&new_text[cursor..region.start()]);
        merged.push_str(old_region);
        cursor = region.end();
    }
    merged.push_str(&new_text[cursor..]);
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merging_a_file_with_itself_is_identity() {
        let text = "a\n/* SAFE REGION BEGIN */\nkeep me\n/* SAFE REGION END */\nb\n";
        assert_eq!(replace_safe_regions(text, text).unwrap(), text);
    }

    #[test]
    fn old_region_content_survives_regeneration() {
        let old = "\
<template>
<!-- SAFE REGION BEGIN -->
<p>hand written markup</p>
<!-- SAFE REGION END -->
<table>v1</table>
</template>
<script>
/* SAFE REGION BEGIN */
import helper from './helper';
/* SAFE REGION END */
export default {};
</script>
";
        let new = "\
<template>
<!-- SAFE REGION BEGIN -->
<!-- SAFE REGION END -->
<table>v2</table>
</template>
<script>
/* SAFE REGION BEGIN */
/* SAFE REGION END */
export default { name: 'X' };
</script>
";
        let merged = replace_safe_regions(new, old).unwrap();
        assert!(merged.contains("<p>hand written markup</p>"));
        assert!(merged.contains("import helper from './helper';"));
        assert!(merged.contains("<table>v2</table>"));
        assert!(merged.contains("export default { name: 'X' };"));
        assert!(!merged.contains("v1"));
    }

    #[test]
    fn regions_pair_in_order() {
        let old = "/* SAFE REGION BEGIN */one/* SAFE REGION END */ x /* SAFE REGION BEGIN */two/* SAFE REGION END */";
        let new = "/* SAFE REGION BEGIN *//* SAFE REGION END */ y /* SAFE REGION BEGIN *//* SAFE REGION END */";
        let merged = replace_safe_regions(new, old).unwrap();
        assert_eq!(
            merged,
            "/* SAFE REGION BEGIN */one/* SAFE REGION END */ y /* SAFE REGION BEGIN */two/* SAFE REGION END */"
        );
    }

    #[test]
    fn region_count_mismatch_is_an_error() {
        let old = "/* SAFE REGION BEGIN */a/* SAFE REGION END */ /* SAFE REGION BEGIN */b/* SAFE REGION END */ /* SAFE REGION BEGIN */c/* SAFE REGION END */";
        let new = "/* SAFE REGION BEGIN *//* SAFE REGION END */ /* SAFE REGION BEGIN *//* SAFE REGION END */";
        assert_eq!(
            replace_safe_regions(new, old),
            Err(MergeError::StructureMismatch { old: 3, new: 2 })
        );
    }

    #[test]
    fn regions_span_many_lines() {
        let old = "/* SAFE REGION BEGIN */\nline1\nline2\nline3\n/* SAFE REGION END */";
        let new = "/* SAFE REGION BEGIN */\n/* SAFE REGION END */";
        let merged = replace_safe_regions(new, old).unwrap();
        assert_eq!(merged, old);
    }
}
