//! Built-in sample tree used by `techtree init` and `techtree view --demo`.

pub const SAMPLE_SCENARIO: &str = "Clinicians and patients with retinal disease look for \
non-invasive diagnostic methods that catch problems early in a clinical setting";

pub const SAMPLE_TREE: &str = "\
# techtree candidate set
# <id> : <name> | <optional description>   (indent = next level, [custom] = user added)

early-detection : Early detection of retinal disease | Find damage before vision loss
    imaging : Retinal imaging | Capture structure of the retina
        oct : Optical coherence tomography | Cross-sectional scans at micron resolution
            swept-source : Swept-source OCT
            oct-angio : OCT angiography
        fundus : Fundus photography | Colour images of the retinal surface
            smartphone : Smartphone fundus adapter
        autofluor : Fundus autofluorescence
    biomarkers : Biomarker analysis | Signals outside the eye
        tear : Tear fluid proteomics
        blood : Blood-based markers
    screening-ai : Automated screening | Triage images without a specialist
        cnn : Convolutional classifiers
        explain : Explainable lesion maps [custom]
monitoring : Monitor disease progression | Track change between visits
    field : Visual field testing
        perimetry : Automated perimetry
        home : Home perimetry apps
    longitudinal : Longitudinal image comparison
        registration : Image registration
access : Improve access to screening | Reach patients outside specialist clinics
    telemed : Tele-ophthalmology
        store-forward : Store-and-forward review
    portable : Portable devices
        handheld-oct : Handheld OCT
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tree;
    use crate::tree::model::Level;

    #[test]
    fn sample_tree_parses_with_all_four_levels() {
        let set = tree::parse(SAMPLE_TREE).expect("sample tree must parse");
        assert_eq!(set.level1.len(), 3);
        assert_eq!(set.candidates(Level::Two, Some("early-detection")).len(), 3);
        assert_eq!(set.candidates(Level::Three, Some("imaging")).len(), 3);
        assert!(set.has_level4());
        assert!(set.get(Level::Three, Some("screening-ai"), "explain").unwrap().is_custom);
    }
}
