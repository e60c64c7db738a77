//! Built-in assistant text: operating instructions, greetings, vision prompt
//! templates, and the default project brief.
//!
//! The project brief is static configuration seeded into the training chat;
//! a deployment can replace it via the `project_brief` config key without
//! touching session state.

/// Operating instructions for the training-results assistant. Always the
/// first system message of a seeded transcript.
pub const SYSTEM_INSTRUCTION: &str = "You are a specialized assistant designed to answer \
questions related to the provided training results in the CSV file, configuration in the \
YAML file, and the overall project brief. If the user asks a question outside the scope of \
this data, politely redirect them to focus on the CSV, YAML, or project details.";

/// Greeting appended after seeding the training-results transcript.
pub const TRAINING_GREETING: &str = "Hi! I am here to help you answer questions related to \
the provided training results and project details. You can ask me about specific metrics, \
patterns, or insights from the CSV data, configuration details in the YAML file, or project \
details.";

/// Greeting for the detection-results chat, which is seeded with nothing else.
pub const DETECTION_GREETING: &str = "Hi! I am here to help you answer questions related to \
the detection results. You can ask me about the objects detected in the image, their \
locations, the confidence levels of the detections, and the accuracy of the results. I can \
also help explain any anomalies or unexpected elements in the detection frame, discuss \
potential improvements, and provide insights into the overall quality of the detection. \
Feel free to ask about any other relevant features or details that stand out in the image.";

/// Fallback reply when a text completion comes back empty.
pub const NO_RESPONSE: &str = "No response available.";

/// Fallback reply when a vision completion comes back empty.
pub const NO_VISION_RESPONSE: &str = "No response available from vision model.";

/// Fallback reply when a follow-up vision completion comes back empty.
pub const NO_FOLLOW_UP_RESPONSE: &str = "No further insights available.";

/// Assistant reply when a detection chat is asked about an image it never
/// received.
pub const NO_IMAGE_AVAILABLE: &str = "No image data available for analysis.";

/// Vision prompt for an attached training artifact. `{description}` is the
/// artifact name supplied by the explain hand-off.
pub fn training_vision_prompt(description: &str) -> String {
    format!(
        "Please provide a detailed analysis of the image below. You may want to extract all \
the data in the image and provide a detailed analysis and description. {description}"
    )
}

/// Vision prompt for the first image of a detection chat.
pub fn detection_vision_prompt(description: &str) -> String {
    format!(
        "You are analyzing an image as part of a model detection results chat. The model \
strictly detects rubbish and its type; the available class labels are: 'electrical goods', \
'rubbish', 'mattress', 'furniture', 'toy', 'bag', 'clothes', 'electrical', 'chair'. The \
user may ask about the content, detected objects, or correctness of the detection results. \
Provide detailed explanations about the objects in the image, their locations, and any \
other relevant features. Consider whether the detections appear accurate based on what is \
visible in the image. {description}"
    )
}

/// Vision prompt for follow-up questions about an already-introduced image.
pub fn detection_follow_up_prompt(question: &str, description: &str) -> String {
    format!(
        "The user has asked a follow-up question regarding the previously analyzed image: \
\"{question}\". Continue analyzing the image and provide relevant insights. {description}"
    )
}

/// Default project brief seeded into the training chat when the config does
/// not point at a replacement file.
pub const PROJECT_BRIEF: &str = "\
Roadside Issue Detection - Project Brief

Introduction
Urban infrastructure maintenance relies heavily on manual inspections of roadside assets, \
which are slow and prone to delays. This project applies an object-detection model to \
images of roadside areas to automatically identify and categorize issues such as illegally \
dumped rubbish.

Potential Users
- City councils and municipal authorities, for monitoring and maintenance scheduling.
- Maintenance teams, to receive timely information about issues requiring attention.
- Urban planners, to analyse trends in asset degradation and waste disposal.

Objectives
1. Measure how accurately an object-detection model can detect and classify roadside \
issues from image data.
2. Determine whether the model can differentiate between rubbish types (mattresses, \
electrical goods, furniture, couches, toys, and similar) to provide detailed insights.

Data
Training uses a 'rubbish' dataset of images showing various types of illegally dumped \
rubbish along roadsides, and a 'not rubbish' dataset of clean roadside areas as negative \
samples. Images are annotated with bounding boxes, converted to a detection-friendly \
format, resized, and normalised; augmentation balances the classes.

Requirements
- Accurate detection and localization: bounding boxes around each detected item.
- Classification of issues: a category label per detected object.
- Confidence scoring: each detection carries a confidence value between 0 and 1 so users \
can judge whether manual verification is needed.
- A simple interface for uploading images and reviewing detections.

Optional extensions include real-time analysis of video feeds from vehicle-mounted \
cameras, scaling to city-wide deployments, and automated issue reporting into existing \
council systems.";
