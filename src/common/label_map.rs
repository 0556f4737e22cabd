use std::collections::HashMap;
use std::path::Path;
use anyhow::Result;
use regex::Regex;

/// Label used when a class index has no entry in the map.
pub const UNKNOWN_LABEL: &str = "object";

const COCO_NAMES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch", "potted plant",
    "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone",
    "microwave", "oven", "toaster", "sink", "refrigerator", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

/// Class index to canonical label string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelMap {
    names: HashMap<usize, String>,
}

impl LabelMap {
    pub fn new(names: HashMap<usize, String>) -> Self {
        Self { names }
    }

    /// The 80 COCO class names in their usual index order.
    pub fn coco() -> Self {
        Self::from_names(&COCO_NAMES)
    }

    pub fn from_names(names: &[&str]) -> Self {
        Self {
            names: names.iter().enumerate().map(|(i, n)| (i, n.to_string())).collect(),
        }
    }

    /// Parses `{"0": "person", "1": "bicycle", ...}`. Keys that are not integers are skipped.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(json)?;
        let names = raw
            .into_iter()
            .filter_map(|(k, v)| k.trim().parse::<usize>().ok().map(|i| (i, v)))
            .collect::<HashMap<_, _>>();
        log::info!("Loaded {} labels", names.len());
        Ok(Self { names })
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parses the `names` entry of exported model metadata.
    /// String format: `{0: 'person', 1: 'bicycle', 2: 'sports ball', ..., 27: "yellow_lady's_slipper"}`
    pub fn from_metadata_names(names: &str) -> Result<Self> {
        let re = Regex::new(r#"(\d+)\s*:\s*(['"])([-()\w '"]+?)(['"])\s*[,}]"#)?;
        let mut map = HashMap::new();
        for (_, [idx, _, name, _]) in re.captures_iter(names).map(|c| c.extract()) {
            if let Ok(idx) = idx.parse::<usize>() {
                map.insert(idx, name.to_string());
            }
        }
        if map.is_empty() {
            anyhow::bail!("No class names found in metadata string");
        }
        Ok(Self { names: map })
    }

    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.names.get(&class_id).map(String::as_str)
    }

    /// Returns the label and whether it was actually known.
    pub fn resolve(&self, class_id: usize) -> (&str, bool) {
        match self.get(class_id) {
            Some(label) => (label, true),
            None => (UNKNOWN_LABEL, false),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
